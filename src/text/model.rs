pub type Timestamp = i64;

/// A metric family as it appears in the exposition, before any normalization.
/// `type_tag` is the TYPE token exactly as written in the document (`untyped` when
/// the family has no TYPE line). Validating it is left to the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetricFamily {
    pub name: String,
    pub help: String,
    pub type_tag: String,
    pub metrics: Vec<RawMetric>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelPair {
    pub name: String,
    pub value: String,
}

impl LabelPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> LabelPair {
        LabelPair {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One series of a family: its label set and the payload that belongs to the family type.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMetric {
    pub labels: Vec<LabelPair>,
    pub timestamp_ms: Option<Timestamp>,
    pub value: RawValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Counter(f64),
    Gauge(f64),
    Untyped(f64),
    Summary(RawSummary),
    Histogram(RawHistogram),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSummary {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub quantiles: Vec<Quantile>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    pub upper_bound: f64,
    pub cumulative_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHistogram {
    pub sample_count: u64,
    pub sample_sum: f64,
    pub buckets: Vec<HistogramBucket>,
}
