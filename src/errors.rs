// errors: Process level errors for elasticsearch_exporter.
#![forbid(unsafe_code)]
#![forbid(missing_docs)]
use crate::httpd::errors::HttpdError;
use std::fmt;
use thiserror::Error;

#[derive(Error)]
pub enum ExporterError {
    /// Raised when a required CLI argument has no value.
    #[error("{0} was not set.")]
    ArgNotSet(String),

    /// Raised when the outbound HTTP client cannot be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),

    /// Raised when the registry fails to encode the gathered metrics.
    #[error("failed to encode metrics")]
    Encode(#[from] fmt::Error),

    /// Raised by the HTTP daemon.
    #[error("{0}")]
    Httpd(#[from] HttpdError),

    /// Raised when a collector describes a metric the registry won't accept.
    #[error("invalid metric descriptor: {0}")]
    InvalidDescriptor(String),

    /// Raised when the async runtime can't be started.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Implements basic output, allowing the above display strings to be used when
// main exits due to an Error.
impl fmt::Debug for ExporterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}
