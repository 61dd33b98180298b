// collector: The Collector trait and the metric model collectors produce.
//
// Collectors are queried on every scrape and hand back freshly built samples.
// They never return errors to the registry, a failure simply yields no
// samples for that scrape.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod cat_master;
pub mod scrape;

pub use cat_master::CatMaster;
pub use scrape::ScrapeCollector;

/// Metadata describing a metric: its fully qualified name, help text and the
/// ordered label names every sample will carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    fq_name:     String,
    help:        String,
    label_names: Vec<String>,
}

impl MetricDescriptor {
    /// Create a new descriptor.
    pub fn new<N, H>(fq_name: N, help: H, label_names: &[&str]) -> Self
    where
        N: Into<String>,
        H: Into<String>,
    {
        Self {
            fq_name:     fq_name.into(),
            help:        help.into(),
            label_names: label_names.iter().map(|l| (*l).to_string()).collect(),
        }
    }

    /// Fully qualified metric name.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    /// Help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Ordered label names.
    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }
}

impl fmt::Display for MetricDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {{{}}} \"{}\"",
            self.fq_name,
            self.label_names.join(", "),
            self.help,
        )
    }
}

/// Raised when label values don't line up with a descriptor's label names.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("inconsistent label cardinality for {name}: expected {expected} label values, got {got}")]
pub struct CardinalityError {
    name:     String,
    expected: usize,
    got:      usize,
}

/// A gauge value with concrete label values, produced fresh on each scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    desc:         Arc<MetricDescriptor>,
    value:        i64,
    label_values: Vec<String>,
}

impl MetricSample {
    /// Create a sample for the given descriptor. The number of label values
    /// must match the number of label names in the descriptor.
    pub fn new(
        desc: Arc<MetricDescriptor>,
        value: i64,
        label_values: Vec<String>,
    ) -> Result<Self, CardinalityError> {
        let expected = desc.label_names().len();
        let got = label_values.len();

        if expected != got {
            return Err(CardinalityError {
                name: desc.fq_name().to_string(),
                expected,
                got,
            });
        }

        Ok(Self {
            desc,
            value,
            label_values,
        })
    }

    /// Descriptor this sample instantiates.
    pub fn desc(&self) -> &Arc<MetricDescriptor> {
        &self.desc
    }

    /// Gauge value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// Label values, in descriptor order.
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label name and value pairs, in descriptor order.
    pub fn labels(&self) -> Vec<(&str, &str)> {
        self.desc
            .label_names()
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
            .collect()
    }
}

/// Anything able to describe its metrics and produce samples for them on each
/// scrape.
pub trait Collector: fmt::Debug + Send + Sync {
    /// The static descriptors of every metric this collector may produce.
    /// Called once at registration time.
    fn describe(&self) -> Vec<Arc<MetricDescriptor>>;

    /// Produce the samples for the current scrape. Must not block beyond the
    /// work needed to fetch the data, and must not fail; failures are logged
    /// and result in fewer samples.
    fn collect(&self) -> Vec<MetricSample>;
}

/// Joins the non-empty components of a metric name with underscores.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
