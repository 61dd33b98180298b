// httpd errors
#![forbid(unsafe_code)]
#![forbid(missing_docs)]
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{
    IntoResponse,
    Response,
};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum HttpdError {
    /// Returned when Httpd cannot bind to the given address.
    #[error("failed to bind to {0}")]
    BindAddress(String),

    /// Returned by the Gatherer::gather trait method when there are issues.
    #[error("error collecting metrics: {0}")]
    CollectorError(String),

    /// Returned when there are issues running the Httpd.
    #[error("std::io::Error: {0}")]
    IoError(#[from] std::io::Error),

    /// Returned when there are issues rendering the index template.
    #[error("failed to render template")]
    RenderTemplate(#[from] askama::Error),
}

// Errors reaching a handler are turned into a plain text 500.
impl IntoResponse for HttpdError {
    fn into_response(self) -> Response {
        warn!("Request failed: {self}");

        let headers = [(CONTENT_TYPE, "text/plain; charset=utf-8")];

        (StatusCode::INTERNAL_SERVER_ERROR, headers, self.to_string())
            .into_response()
    }
}
