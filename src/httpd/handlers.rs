//
// elasticsearch_exporter
//
// This module deals with httpd route handlers.
//
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::AppState;
use super::errors::HttpdError;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use std::sync::Arc;
use tracing::debug;

const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

// Displays the index page. This is a page which simply links to the actual
// telemetry path.
pub(in crate::httpd) async fn index(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    debug!("Displaying index page");

    let headers = [(CONTENT_TYPE, "text/html; charset=utf-8")];

    (headers, state.index_page.clone())
}

// Returns the exporter output, or an InternalServerError if things fail for
// some reason.
// Collectors block on their HTTP requests, so gathering is moved off the async
// workers.
pub(in crate::httpd) async fn metrics(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpdError> {
    debug!("Processing metrics request");

    let gatherer = Arc::clone(&state.gatherer);
    let body = tokio::task::spawn_blocking(move || gatherer.gather())
        .await
        .map_err(|e| HttpdError::CollectorError(e.to_string()))??;

    let headers = [(CONTENT_TYPE, OPENMETRICS_CONTENT_TYPE)];

    Ok((headers, body))
}
