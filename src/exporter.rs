// exporter: Owns the metrics registry and turns it into exposition text.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::collector::{
    Collector,
    MetricDescriptor,
    ScrapeCollector,
};
use crate::errors::ExporterError;
use crate::httpd::{
    errors::HttpdError,
    Gatherer,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::info::Info;
use prometheus_client::registry::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

// Labels on the build_info metric.
type BuildInfoLabels = Vec<(String, String)>;

/// Exporter structure holding the registry that is scraped.
#[derive(Debug)]
pub struct Exporter {
    registry: Registry,
}

impl Exporter {
    /// Create an exporter over the given collectors.
    ///
    /// Every collector is asked to describe its metrics once here, and
    /// registration fails if any description is unusable.
    pub fn new(
        collectors: Vec<Arc<dyn Collector>>,
    ) -> Result<Self, ExporterError> {
        let mut registry = Registry::default();

        validate_descriptors(&collectors)?;

        let build_info: BuildInfoLabels = vec![
            ("version".into(), env!("CARGO_PKG_VERSION").into()),
            ("rustc_version".into(), env!("RUSTC_VERSION").into()),
        ];

        registry.register(
            "elasticsearch_exporter_build",
            "A metric with a constant '1' value labelled by version and the \
             rustc version from which elasticsearch_exporter was built",
            Info::new(build_info),
        );

        registry.register_collector(Box::new(ScrapeCollector::new(collectors)));

        Ok(Self { registry })
    }

    /// Collect and export the metrics.
    ///
    /// This queries every collector and returns the OpenMetrics text
    /// exposition. It blocks for as long as the slowest collector.
    pub fn export(&self) -> Result<String, ExporterError> {
        debug!("Exporting metrics");

        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;

        Ok(buffer)
    }
}

impl Gatherer for Exporter {
    fn gather(&self) -> Result<String, HttpdError> {
        self.export()
            .map_err(|e| HttpdError::CollectorError(e.to_string()))
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    // Names starting with __ are reserved.
    if name.starts_with("__") {
        return false;
    }

    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Checks every descriptor is well formed, and that collectors sharing a metric
// name agree on what it looks like.
fn validate_descriptors(
    collectors: &[Arc<dyn Collector>],
) -> Result<(), ExporterError> {
    let mut seen: HashMap<String, Arc<MetricDescriptor>> = HashMap::new();

    for desc in collectors.iter().flat_map(|c| c.describe()) {
        debug!("Registering descriptor: {desc}");

        if !is_valid_metric_name(desc.fq_name()) {
            let msg = format!("'{}' is not a valid metric name", desc.fq_name());
            return Err(ExporterError::InvalidDescriptor(msg));
        }

        if let Some(label) = desc
            .label_names()
            .iter()
            .find(|l| !is_valid_label_name(l))
        {
            let msg = format!(
                "'{label}' is not a valid label name for {}",
                desc.fq_name(),
            );
            return Err(ExporterError::InvalidDescriptor(msg));
        }

        match seen.get(desc.fq_name()) {
            Some(existing) if **existing != *desc => {
                let msg = format!(
                    "conflicting descriptors for {}: {existing} and {desc}",
                    desc.fq_name(),
                );
                return Err(ExporterError::InvalidDescriptor(msg));
            },
            Some(_) => {},
            None => {
                seen.insert(desc.fq_name().to_string(), desc);
            },
        }
    }

    Ok(())
}
