// scrape: Bridges our collectors into the prometheus_client registry.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    Collector,
    MetricDescriptor,
    MetricSample,
};
use prometheus_client::encoding::DescriptorEncoder;
use prometheus_client::metrics::MetricType;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tracing::{
    debug,
    dispatcher::{
        self,
        Dispatch,
    },
    warn,
};

/// A registry collector that queries every registered Collector on each
/// scrape and encodes whatever samples they return.
///
/// Collectors are queried concurrently, so a slow collector only delays the
/// scrape by its own duration.
#[derive(Debug)]
pub struct ScrapeCollector {
    collectors: Vec<Arc<dyn Collector>>,
}

impl ScrapeCollector {
    /// Create a new ScrapeCollector over the given collectors.
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Query all collectors, returning their samples in registration order.
    pub fn collect(&self) -> Vec<MetricSample> {
        debug!(collectors = self.collectors.len(), "Collecting samples");

        // Worker threads don't inherit the caller's scoped dispatcher, so it
        // is handed over explicitly.
        let dispatch = dispatcher::get_default(Dispatch::clone);

        thread::scope(|scope| {
            let handles: Vec<_> = self.collectors
                .iter()
                .map(|collector| {
                    let dispatch = dispatch.clone();

                    scope.spawn(move || {
                        dispatcher::with_default(&dispatch, || {
                            collector.collect()
                        })
                    })
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .flat_map(|(index, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        warn!(collector = index, "collector panicked");
                        Vec::new()
                    })
                })
                .collect()
        })
    }
}

// Groups samples sharing a metric name, keeping first-seen order.
fn group_by_descriptor(
    samples: &[MetricSample],
) -> Vec<(&MetricDescriptor, Vec<&MetricSample>)> {
    let mut groups: Vec<(&MetricDescriptor, Vec<&MetricSample>)> = Vec::new();

    for sample in samples {
        let name = sample.desc().fq_name();
        let position = groups
            .iter()
            .position(|(desc, _)| desc.fq_name() == name);

        match position {
            Some(i) => groups[i].1.push(sample),
            None    => groups.push((sample.desc().as_ref(), vec![sample])),
        }
    }

    groups
}

// The text encoder writes label values verbatim, escaping is up to us.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"'  => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c    => escaped.push(c),
        }
    }

    escaped
}

impl prometheus_client::collector::Collector for ScrapeCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), fmt::Error> {
        let samples = self.collect();

        // Metrics without samples get no descriptor at all, so they're
        // entirely absent from the output.
        for (desc, samples) in group_by_descriptor(&samples) {
            let mut metric_encoder = encoder.encode_descriptor(
                desc.fq_name(),
                desc.help(),
                None,
                MetricType::Gauge,
            )?;

            for sample in samples {
                if desc.label_names().is_empty() {
                    metric_encoder.encode_gauge(&sample.value())?;
                    continue;
                }

                let labels: Vec<(&str, String)> = sample
                    .labels()
                    .into_iter()
                    .map(|(name, value)| (name, escape_label_value(value)))
                    .collect();

                metric_encoder
                    .encode_family(&labels)?
                    .encode_gauge(&sample.value())?;
            }
        }

        Ok(())
    }
}
