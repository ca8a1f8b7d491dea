use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Player id → display name lookup.
///
/// Entries only carry the platform's player id; leaderboards show the most
/// recently seen display name for it.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    /// Records (or refreshes) the display name for a player
    async fn register_player(&self, player: &str, display_name: &str);

    async fn display_name(&self, player: &str) -> Option<String>;

    /// Display name, falling back to the raw id when none is known
    async fn display_name_or_id(&self, player: &str) -> String {
        self.display_name(player)
            .await
            .unwrap_or_else(|| player.to_string())
    }
}

/// In-memory implementation of PlayerDirectory
/// Uses RwLock for concurrent access with read optimization
#[derive(Debug, Default)]
pub struct InMemoryPlayerDirectory {
    names: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryPlayerDirectory {
    pub fn new() -> Self {
        Self {
            names: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PlayerDirectory for InMemoryPlayerDirectory {
    async fn register_player(&self, player: &str, display_name: &str) {
        let mut names = self.names.write().await;
        match names.insert(player.to_string(), display_name.to_string()) {
            Some(previous) if previous != display_name => {
                info!(player, previous = %previous, display_name, "Player display name changed");
            }
            Some(_) => {}
            None => info!(player, display_name, "Registered player display name"),
        }
    }

    async fn display_name(&self, player: &str) -> Option<String> {
        let names = self.names.read().await;
        let result = names.get(player).cloned();
        debug!(player, display_name = ?result, "Display name lookup");
        result
    }
}
