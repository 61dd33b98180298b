// Command line interface parsing validators
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use reqwest::Url;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::{
    debug,
    Level,
};

// Ensures the Elasticsearch URI is an absolute http(s) URL with a host.
pub fn is_valid_es_uri(s: &str) -> Result<Url, String> {
    debug!("Ensuring that es.uri is valid");

    let url = Url::parse(s)
        .map_err(|e| format!("'{s}' is not a valid URL: {e}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err("es.uri scheme must be http or https".to_owned());
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err("es.uri must include a host".to_owned());
    }

    Ok(url)
}

// Parses a request timeout such as 500ms, 5s or 1m.
pub fn is_valid_timeout(s: &str) -> Result<Duration, String> {
    debug!("Ensuring that es.timeout is valid");

    let invalid = || format!("'{s}' is not a valid timeout, expected e.g. 5s");

    // ms must be checked before s, since it also ends in s.
    let (number, millis_per_unit) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1)
    }
    else if let Some(n) = s.strip_suffix('s') {
        (n, 1_000)
    }
    else if let Some(n) = s.strip_suffix('m') {
        (n, 60_000)
    }
    else {
        return Err(invalid());
    };

    let number = number.parse::<u64>().map_err(|_| invalid())?;

    if number == 0 {
        return Err("es.timeout must be greater than zero".to_owned());
    }

    let millis = number.checked_mul(millis_per_unit).ok_or_else(invalid)?;

    Ok(Duration::from_millis(millis))
}

// Parses a log level name.
pub fn is_valid_log_level(s: &str) -> Result<Level, String> {
    debug!("Ensuring that log.level is valid");

    Level::from_str(s).map_err(|_| {
        format!("'{s}' is not a valid log level, expected one of trace, \
                 debug, info, warn or error")
    })
}

// Used as a validator for the argument parsing.
// We validate the parse to SocketAddr here but still continue to return a
// string. TcpListener::bind is fine with taking a string there.
pub fn is_valid_socket_addr(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.listen-address is valid");

    match SocketAddr::from_str(s) {
        Ok(_)  => Ok(s.to_string()),
        Err(_) => Err(format!("'{s}' is not a valid ADDR:PORT string")),
    }
}

// Checks that the telemetry_path is valid.
// This check is extremely basic, and there may still be invalid paths that
// could be passed.
pub fn is_valid_telemetry_path(s: &str) -> Result<String, String> {
    debug!("Ensuring that web.telemetry-path is valid");

    // Ensure s isn't empty.
    if s.is_empty() {
        return Err("path must not be empty".to_owned());
    }

    // Ensure that s starts with /
    if !s.starts_with('/') {
        return Err("path must start with /".to_owned());
    }

    // Ensure that s isn't literally /
    if s == "/" {
        return Err("path must not be /".to_owned());
    }

    Ok(s.to_string())
}
