// This trait must be implemented so the HTTPd can export metrics.
//
// gather is called from a blocking thread, so implementations are free to do
// blocking I/O.
use super::errors::HttpdError;

pub trait Gatherer: Send + Sync + 'static {
    fn gather(&self) -> Result<String, HttpdError>;
}
