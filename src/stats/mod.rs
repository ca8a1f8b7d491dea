pub mod aggregator;
pub mod handlers;
pub mod query;
pub mod ranker;
pub mod service;
pub mod types;

mod errors;
pub mod models;

pub use errors::TrackerError;
pub use models::*;
pub use query::QueryToken;
pub use service::{TrackerService, TrackerServiceBuilder};
