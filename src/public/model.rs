use std::{collections::BTreeMap, fmt};

use serde::Serialize;

/// Label names to values. Ordered by name, which is also the order the flattener
/// emits label values in.
pub type Labels = BTreeMap<String, String>;

/// A metric family after normalization: every entry of `metrics` has the shape that
/// `family_type` calls for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    #[serde(rename = "type")]
    pub family_type: MetricType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricValue>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    /// A cumulative value that only goes up (or resets to zero).
    Counter,
    /// A current measurement that can go up and down.
    Gauge,
    /// A single value whose kind the exposition didn't declare.
    Untyped,
    /// Quantiles over a sliding window plus a count and a sum of observations.
    Summary,
    /// Cumulative bucket counts plus a count and a sum of observations.
    Histogram,
}

impl MetricType {
    /// Matches a TYPE token of the text format exactly.
    pub fn from_tag(tag: &str) -> Option<MetricType> {
        match tag {
            "counter" => Some(MetricType::Counter),
            "gauge" => Some(MetricType::Gauge),
            "untyped" => Some(MetricType::Untyped),
            "summary" => Some(MetricType::Summary),
            "histogram" => Some(MetricType::Histogram),
            _ => None,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Counter => "COUNTER",
            MetricType::Gauge => "GAUGE",
            MetricType::Untyped => "UNTYPED",
            MetricType::Summary => "SUMMARY",
            MetricType::Histogram => "HISTOGRAM",
        };

        f.write_str(name)
    }
}

/// One series of a family. Numbers are kept as text so that nothing downstream
/// reinterprets their precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Simple(SimpleValue),
    Summary(SummaryValue),
    Histogram(HistogramValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleValue {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryValue {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    /// Quantile level to observed value.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub quantiles: BTreeMap<String, String>,
    pub count: String,
    pub sum: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramValue {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
    /// Upper bound (`+Inf` included) to cumulative count.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub buckets: BTreeMap<String, String>,
    pub count: String,
    pub sum: String,
}

impl MetricValue {
    pub fn labels(&self) -> &Labels {
        match self {
            MetricValue::Simple(simple) => &simple.labels,
            MetricValue::Summary(summary) => &summary.labels,
            MetricValue::Histogram(histogram) => &histogram.labels,
        }
    }
}
