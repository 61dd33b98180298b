// client: The outbound HTTP client used by collectors.
//
// Collectors only ever see the HttpClient trait, which keeps them testable
// with a fake client. ReqwestClient is the implementation used at runtime.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use reqwest::Url;
use std::fmt;
use std::io::{
    self,
    Read,
};
use std::time::Duration;
use tracing::debug;

/// Error returned by an HttpClient when no response could be obtained.
pub type ClientError = Box<dyn std::error::Error + Send + Sync>;

/// The body of a response. Reading it consumes the data, closing it releases
/// the underlying connection.
pub trait ResponseBody: Read + Send {
    /// Release the body. Implementations that can't fail to close may rely on
    /// the default, which simply drops the body.
    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

/// A response as seen by a collector.
pub struct HttpResponse {
    /// Numeric HTTP status code.
    pub status: u16,

    /// Response body, not yet read.
    pub body: Box<dyn ResponseBody>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// A blocking HTTP client. Must be safe to share between threads, since all
/// collectors are invoked concurrently on each scrape.
pub trait HttpClient: fmt::Debug + Send + Sync {
    /// Issue a GET request for the given URL.
    fn get(&self, url: &Url) -> Result<HttpResponse, ClientError>;
}

/// Options used to construct a ReqwestClient.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Upper bound on the duration of a single request.
    pub timeout: Duration,

    /// Accept invalid TLS certificates from the cluster.
    pub insecure: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout:  Duration::from_secs(5),
            insecure: false,
        }
    }
}

/// HttpClient backed by a blocking reqwest Client.
///
/// This must be built outside of the async runtime, and only used from
/// blocking threads.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    inner: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a new client from the given config.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        debug!(
            timeout = ?config.timeout,
            insecure = config.insecure,
            "Building HTTP client"
        );

        let user_agent = concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION"),
        );

        let inner = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { inner })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &Url) -> Result<HttpResponse, ClientError> {
        let response = self.inner.get(url.clone()).send()?;

        Ok(HttpResponse {
            status: response.status().as_u16(),
            body:   Box::new(response),
        })
    }
}

// Dropping the response returns the connection to the pool, there is nothing
// to report.
impl ResponseBody for reqwest::blocking::Response {}

/// Returns a copy of `url` that is safe to log, with any password replaced.
pub fn redact(url: &Url) -> Url {
    let mut url = url.clone();

    if url.password().is_some() {
        // Only fails for URLs that can't carry credentials in the first place.
        let _ = url.set_password(Some("REDACTED"));
    }

    url
}
