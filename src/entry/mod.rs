pub mod models;
pub mod repository;

pub use models::Entry;
pub use repository::{EntryRepository, InMemoryEntryRepository, PostgresEntryRepository, Upsert};
