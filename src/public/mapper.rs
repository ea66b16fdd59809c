use std::collections::BTreeMap;
use std::convert::TryFrom;

use log::trace;

use super::model::*;
use crate::error::UnknownTypeError;
use crate::text::{format_float, LabelPair, RawMetric, RawMetricFamily, RawValue};

/// Normalizes tokenized families, keeping the order of families and of the series
/// inside them. Stops at the first family whose type isn't one of the five known kinds.
pub fn map_families(records: Vec<RawMetricFamily>) -> Result<Vec<MetricFamily>, UnknownTypeError> {
    records.into_iter().map(MetricFamily::try_from).collect()
}

impl TryFrom<RawMetricFamily> for MetricFamily {
    type Error = UnknownTypeError;

    fn try_from(raw: RawMetricFamily) -> Result<Self, Self::Error> {
        let family_type = match MetricType::from_tag(&raw.type_tag) {
            Some(family_type) => family_type,
            None => {
                return Err(UnknownTypeError {
                    family: raw.name,
                    type_tag: raw.type_tag,
                })
            }
        };

        let metrics: Vec<MetricValue> = raw
            .metrics
            .into_iter()
            .map(|metric| make_value(family_type, metric))
            .collect();

        trace!(
            "mapped family {} ({}) with {} series",
            raw.name,
            family_type,
            metrics.len()
        );

        Ok(MetricFamily {
            name: raw.name,
            help: raw.help,
            family_type,
            metrics,
        })
    }
}

fn make_value(family_type: MetricType, metric: RawMetric) -> MetricValue {
    let labels = make_labels(metric.labels);

    match family_type {
        MetricType::Summary => {
            let summary = match metric.value {
                RawValue::Summary(summary) => summary,
                _ => Default::default(),
            };

            MetricValue::Summary(SummaryValue {
                labels,
                quantiles: summary
                    .quantiles
                    .iter()
                    .map(|q| (format_float(q.quantile), format_float(q.value)))
                    .collect(),
                count: summary.sample_count.to_string(),
                sum: format_float(summary.sample_sum),
            })
        }
        MetricType::Histogram => {
            let histogram = match metric.value {
                RawValue::Histogram(histogram) => histogram,
                _ => Default::default(),
            };

            MetricValue::Histogram(HistogramValue {
                labels,
                buckets: histogram
                    .buckets
                    .iter()
                    .map(|b| (format_float(b.upper_bound), b.cumulative_count.to_string()))
                    .collect(),
                count: histogram.sample_count.to_string(),
                sum: format_float(histogram.sample_sum),
            })
        }
        MetricType::Counter | MetricType::Gauge | MetricType::Untyped => {
            MetricValue::Simple(SimpleValue {
                labels,
                value: format_float(scalar_value(&metric.value)),
            })
        }
    }
}

fn scalar_value(value: &RawValue) -> f64 {
    match value {
        RawValue::Gauge(v) | RawValue::Counter(v) | RawValue::Untyped(v) => *v,
        RawValue::Summary(_) | RawValue::Histogram(_) => 0.,
    }
}

/// A repeated label name keeps its last value.
fn make_labels(pairs: Vec<LabelPair>) -> BTreeMap<String, String> {
    pairs.into_iter().map(|pair| (pair.name, pair.value)).collect()
}
