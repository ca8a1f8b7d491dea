use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::stats::{TrackerError, TrackerService};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<TrackerService>,
}

impl AppState {
    pub fn new(tracker: Arc<TrackerService>) -> Self {
        Self { tracker }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Tracker(err) = self;
        let status = match &err {
            TrackerError::MalformedSubmission(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TrackerError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::StoreFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        if err.is_retryable() {
            warn!(error = %err, "Retryable failure surfaced to client");
        }

        let body = Json(json!({
            "error": err.to_string()
        }));

        (status, body).into_response()
    }
}
