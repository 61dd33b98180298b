//
// elasticsearch_exporter
//
// An exporter for Prometheus, exporting Elasticsearch cluster status as
// reported by the cat APIs.
//
#![forbid(unsafe_code)]
use clap::ArgMatches;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{
    debug,
    info,
    Level,
};

mod cli;
mod client;
mod collector;
mod errors;
mod exporter;
mod httpd;

use client::{
    ClientConfig,
    HttpClient,
    ReqwestClient,
};
use collector::{
    CatMaster,
    Collector,
};
use errors::ExporterError;
use exporter::Exporter;

// Fetches a validated argument from the matches. Every argument has a default
// so this only fails if the app definition and the names here drift apart.
fn get_arg<T>(matches: &ArgMatches, name: &str) -> Result<T, ExporterError>
where T: Clone + Send + Sync + 'static {
    matches
        .get_one::<T>(name)
        .cloned()
        .ok_or_else(|| ExporterError::ArgNotSet(name.to_owned()))
}

fn main() -> Result<(), ExporterError> {
    // Parse the commandline arguments.
    let matches = cli::parse_args();

    let level: Level = get_arg(&matches, "LOG_LEVEL")?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .init();

    let es_uri: Url = get_arg(&matches, "ES_URI")?;
    info!("Elasticsearch URI: {}", client::redact(&es_uri));

    let timeout: Duration = get_arg(&matches, "ES_TIMEOUT")?;
    debug!("es.timeout: {timeout:?}");

    let insecure = matches.get_flag("ES_SSL_SKIP_VERIFY");
    debug!("es.ssl-skip-verify: {insecure}");

    let bind_address: String = get_arg(&matches, "WEB_LISTEN_ADDRESS")?;
    debug!("web.listen-address: {bind_address}");

    let telemetry_path: String = get_arg(&matches, "WEB_TELEMETRY_PATH")?;
    debug!("web.telemetry-path: {telemetry_path}");

    // The blocking client spins up its own runtime internally, so it must be
    // created before we enter ours.
    let config = ClientConfig {
        timeout,
        insecure,
    };
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(&config)?);

    let collectors: Vec<Arc<dyn Collector>> = vec![
        Arc::new(CatMaster::new(client, es_uri)),
    ];

    let exporter = Exporter::new(collectors)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        httpd::Server::new()
            .bind_address(bind_address)
            .telemetry_path(telemetry_path)
            .run(Arc::new(exporter))
            .await
    })?;

    Ok(())
}
