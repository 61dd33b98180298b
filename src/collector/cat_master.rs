// cat_master: Exposes the name of the current master node, as reported by the
//             _cat/master API.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    build_fq_name,
    CardinalityError,
    Collector,
    MetricDescriptor,
    MetricSample,
};
use crate::client::{
    redact,
    ClientError,
    HttpClient,
};
use reqwest::Url;
use std::fmt;
use std::io::{
    self,
    Read,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{
    debug,
    warn,
};

const CAT_MASTER_PATH: &str = "_cat/master";

// _cat/master responds with "id host ip node", the node name is the fourth
// field.
const MASTER_NAME_FIELD: usize = 3;

// The metric only identifies which node is master, so its value never changes.
const MASTER_VALUE: i64 = 1;

// Characters of an unparseable body kept in error messages.
const BODY_EXCERPT_CHARS: usize = 256;

/// Raised when the _cat/master response couldn't be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("failed to get cat master from {target}: {source}")]
    Transport {
        /// scheme://host:port/path of the request, without credentials.
        target: String,

        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// The cluster responded with something other than 200 OK.
    #[error("HTTP request failed with code {0}")]
    Status(u16),

    /// The response body couldn't be read.
    #[error("failed to read response body: {0}")]
    ReadBody(#[source] io::Error),
}

/// Raised when the _cat/master response has fewer fields than expected.
///
/// The message only shows the start of the body, the full body is kept in
/// the `body` field.
#[derive(Debug, Error)]
#[error("unexpected response format: {}", excerpt(.body))]
pub struct ParseError {
    /// The raw response body.
    pub body: String,
}

/// Any failure during a single CatMaster collection.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// See FetchError.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// See ParseError.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The sample couldn't be built from the extracted value.
    #[error(transparent)]
    Sample(#[from] CardinalityError),
}

impl CollectorError {
    /// Short classification of the error, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(_)  => "fetch",
            Self::Parse(_)  => "parse",
            Self::Sample(_) => "sample",
        }
    }
}

/// Collector for the `elasticsearch_cluster_role_master` metric.
pub struct CatMaster {
    client: Arc<dyn HttpClient>,
    url:    Url,
    master: Arc<MetricDescriptor>,
}

// The configured URL may carry credentials.
impl fmt::Debug for CatMaster {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CatMaster")
            .field("client", &self.client)
            .field("url", &redact(&self.url).as_str())
            .field("master", &self.master)
            .finish()
    }
}

impl CatMaster {
    /// Create a new CatMaster collector querying the cluster at `url`.
    pub fn new(client: Arc<dyn HttpClient>, url: Url) -> Self {
        let master = MetricDescriptor::new(
            build_fq_name("elasticsearch", "cluster_role", "master"),
            "The master role in the master node.",
            &["master_role_name"],
        );

        Self {
            client,
            url,
            master: Arc::new(master),
        }
    }

    // The _cat/master endpoint below the configured base URL.
    fn endpoint(&self) -> Url {
        let mut url = self.url.clone();
        let path = format!(
            "{}/{CAT_MASTER_PATH}",
            url.path().trim_end_matches('/'),
        );

        url.set_path(&path);
        url
    }

    // Fetches _cat/master and returns the name of the master node.
    fn fetch_and_decode(&self) -> Result<String, CollectorError> {
        let url = self.endpoint();
        debug!(path = url.path(), "Fetching cat master");

        let response = self.client.get(&url).map_err(|source| {
            FetchError::Transport {
                target: target(&url),
                source,
            }
        })?;

        let mut body = response.body;
        let result = decode(response.status, &mut body);

        // The body is released whatever happened above. A failure here is
        // only worth a warning and never replaces the real result.
        if let Err(err) = body.close() {
            warn!(error = %err, "failed to close response body");
        }

        result
    }
}

impl Collector for CatMaster {
    fn describe(&self) -> Vec<Arc<MetricDescriptor>> {
        vec![Arc::clone(&self.master)]
    }

    fn collect(&self) -> Vec<MetricSample> {
        let sample = self
            .fetch_and_decode()
            .and_then(|name| {
                let sample = MetricSample::new(
                    Arc::clone(&self.master),
                    MASTER_VALUE,
                    vec![name],
                )?;

                Ok(sample)
            });

        match sample {
            Ok(sample) => vec![sample],
            Err(err) => {
                warn!(
                    kind = %err.kind(),
                    error = %err,
                    "failed to fetch and decode cat master"
                );

                Vec::new()
            },
        }
    }
}

// Request target for error messages. Built from parts so that credentials in
// the URL are left out.
fn target(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();

    match url.port_or_known_default() {
        Some(port) => format!("{}://{host}:{port}{}", url.scheme(), url.path()),
        None       => format!("{}://{host}{}", url.scheme(), url.path()),
    }
}

// Shortens a body for display.
fn excerpt(body: &str) -> String {
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => {
            format!("{}... ({} bytes total)", &body[..end], body.len())
        },
        None => body.to_string(),
    }
}

// Checks the status, reads the whole body and extracts the master name.
fn decode<R>(status: u16, body: &mut R) -> Result<String, CollectorError>
where
    R: Read + ?Sized,
{
    if status != 200 {
        return Err(FetchError::Status(status).into());
    }

    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes).map_err(FetchError::ReadBody)?;

    let body = String::from_utf8_lossy(&bytes);
    let name = master_name(&body)?;

    Ok(name.to_string())
}

// Splits the body on whitespace and returns the master node name field.
fn master_name(body: &str) -> Result<&str, ParseError> {
    body.split_whitespace()
        .nth(MASTER_NAME_FIELD)
        .ok_or_else(|| ParseError { body: body.to_string() })
}
