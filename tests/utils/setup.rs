use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use puzzle_tracker::{
    build_router, puzzle::FixedClock, AppState, InMemoryEntryRepository, TrackerService,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub tracker: Arc<TrackerService>,
    pub repository: Arc<InMemoryEntryRepository>,
}

impl TestSetup {
    /// Sends one request through the full router and decodes the JSON body
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    /// Posts a raw chat message and asserts it was accepted
    pub async fn share(&self, player: &str, text: &str) {
        let (status, outcome) = self
            .post(
                "/submissions",
                serde_json::json!({ "player": player, "text": text }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["accepted"], true, "rejected share: {text}");
    }
}

pub struct TestSetupBuilder {
    today: NaiveDate,
}

impl TestSetupBuilder {
    /// Defaults to Wednesday 2024-01-10: Connections #213, Wordle #935
    pub fn new() -> Self {
        Self {
            today: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn build(self) -> TestSetup {
        let repository = Arc::new(InMemoryEntryRepository::new());
        let tracker = Arc::new(
            TrackerService::builder(repository.clone())
                .with_clock(Arc::new(FixedClock(self.today)))
                .build(),
        );
        let app = build_router(AppState::new(tracker.clone()));

        TestSetup {
            app,
            tracker,
            repository,
        }
    }
}
