use std::{collections::HashMap, str::Utf8Error};

use pest::Parser;
use thiserror::Error;

use super::model::*;
use super::utils::unescape_str;

#[derive(Parser)]
#[grammar = "text/text.pest"]
struct TextGrammar;

pub const COUNTER: &str = "counter";
pub const GAUGE: &str = "gauge";
pub const UNTYPED: &str = "untyped";
pub const SUMMARY: &str = "summary";
pub const HISTOGRAM: &str = "histogram";

const QUANTILE_LABEL: &str = "quantile";
const BUCKET_LABEL: &str = "le";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    ParseError(Box<pest::error::Error<Rule>>),
    #[error("exposition is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("found two samples for the same series of {0}")]
    DuplicateMetric(String),
    #[error("{0}")]
    InvalidMetric(String),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        ParseError::ParseError(Box::new(err))
    }
}

/// Which part of a family a sample line feeds, derived from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SampleKind {
    Value,
    Sum,
    Count,
    Bucket,
}

const SUFFIXES: [(&str, SampleKind, &[&str]); 3] = [
    ("_bucket", SampleKind::Bucket, &[HISTOGRAM]),
    ("_sum", SampleKind::Sum, &[SUMMARY, HISTOGRAM]),
    ("_count", SampleKind::Count, &[SUMMARY, HISTOGRAM]),
];

trait MarshalledMetricFamily {
    type Error;
    fn process_new_metric(
        &mut self,
        sample_name: &str,
        kind: SampleKind,
        labels: Vec<LabelPair>,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Default)]
struct SummaryMarshal {
    count: Option<u64>,
    sum: Option<f64>,
    quantiles: Vec<Quantile>,
}

#[derive(Debug, Default)]
struct HistogramMarshal {
    count: Option<u64>,
    sum: Option<f64>,
    buckets: Vec<HistogramBucket>,
}

#[derive(Debug)]
enum MetricValueMarshal {
    Counter(f64),
    Gauge(f64),
    Untyped(f64),
    Summary(SummaryMarshal),
    Histogram(HistogramMarshal),
}

impl From<MetricValueMarshal> for RawValue {
    fn from(m: MetricValueMarshal) -> RawValue {
        match m {
            MetricValueMarshal::Counter(v) => RawValue::Counter(v),
            MetricValueMarshal::Gauge(v) => RawValue::Gauge(v),
            MetricValueMarshal::Untyped(v) => RawValue::Untyped(v),
            MetricValueMarshal::Summary(s) => RawValue::Summary(RawSummary {
                sample_count: s.count.unwrap_or(0),
                sample_sum: s.sum.unwrap_or(0.),
                quantiles: s.quantiles,
            }),
            MetricValueMarshal::Histogram(h) => RawValue::Histogram(RawHistogram {
                sample_count: h.count.unwrap_or(0),
                sample_sum: h.sum.unwrap_or(0.),
                buckets: h.buckets,
            }),
        }
    }
}

#[derive(Debug)]
struct MetricMarshal {
    labels: Vec<LabelPair>,
    timestamp: Option<Timestamp>,
    value: MetricValueMarshal,
}

impl From<MetricMarshal> for RawMetric {
    fn from(m: MetricMarshal) -> RawMetric {
        RawMetric {
            labels: m.labels,
            timestamp_ms: m.timestamp,
            value: m.value.into(),
        }
    }
}

#[derive(Debug)]
struct MetricFamilyMarshal {
    name: String,
    help: Option<String>,
    family_type: Option<String>,
    metrics: Vec<MetricMarshal>,
}

impl MetricFamilyMarshal {
    fn empty(name: &str) -> MetricFamilyMarshal {
        MetricFamilyMarshal {
            name: name.to_owned(),
            help: None,
            family_type: None,
            metrics: Vec::new(),
        }
    }

    fn family_type(&self) -> &str {
        self.family_type.as_deref().unwrap_or(UNTYPED)
    }

    fn try_add_help(&mut self, help: String) -> Result<(), ParseError> {
        if self.help.is_some() {
            return Err(ParseError::InvalidMetric(format!(
                "Got two help lines for metric family {}",
                self.name
            )));
        }

        self.help = Some(help);
        Ok(())
    }

    fn try_add_type(&mut self, family_type: &str) -> Result<(), ParseError> {
        if self.family_type.is_some() {
            return Err(ParseError::InvalidMetric(format!(
                "Got two type lines for metric family {}",
                self.name
            )));
        }

        if !self.metrics.is_empty() {
            return Err(ParseError::InvalidMetric(format!(
                "Type line for {} after its samples",
                self.name
            )));
        }

        self.family_type = Some(family_type.to_owned());
        Ok(())
    }

    /// Finds the series with this label set, opening an empty one of the family's
    /// compound type if it doesn't exist yet.
    fn series_mut(
        &mut self,
        labels: Vec<LabelPair>,
        timestamp: Option<Timestamp>,
    ) -> &mut MetricValueMarshal {
        let index = match self.metrics.iter().position(|m| m.labels == labels) {
            Some(index) => index,
            None => {
                let value = match self.family_type() {
                    HISTOGRAM => MetricValueMarshal::Histogram(HistogramMarshal::default()),
                    _ => MetricValueMarshal::Summary(SummaryMarshal::default()),
                };
                self.metrics.push(MetricMarshal {
                    labels,
                    timestamp,
                    value,
                });
                self.metrics.len() - 1
            }
        };

        &mut self.metrics[index].value
    }
}

impl MarshalledMetricFamily for MetricFamilyMarshal {
    type Error = ParseError;

    fn process_new_metric(
        &mut self,
        sample_name: &str,
        kind: SampleKind,
        mut labels: Vec<LabelPair>,
        value: f64,
        timestamp: Option<Timestamp>,
    ) -> Result<(), Self::Error> {
        let family_type = self.family_type().to_owned();

        match (family_type.as_str(), kind) {
            (SUMMARY, SampleKind::Value) => {
                let quantile = take_label(&mut labels, QUANTILE_LABEL).ok_or_else(|| {
                    ParseError::InvalidMetric(format!(
                        "Missing mandatory label for metric {}: {}",
                        sample_name, QUANTILE_LABEL
                    ))
                })?;
                let quantile = parse_float(&quantile, "Summary quantiles")?;

                if let MetricValueMarshal::Summary(summary) = self.series_mut(labels, timestamp) {
                    summary.quantiles.push(Quantile { quantile, value });
                } else {
                    unreachable!();
                }
            }
            (HISTOGRAM, SampleKind::Value) => {
                return Err(ParseError::InvalidMetric(format!(
                    "Found weird metric name for histogram {}: {}",
                    self.name, sample_name
                )));
            }
            (_, SampleKind::Bucket) => {
                let bound = take_label(&mut labels, BUCKET_LABEL).ok_or_else(|| {
                    ParseError::InvalidMetric(format!(
                        "Missing mandatory label for metric {}: {}",
                        sample_name, BUCKET_LABEL
                    ))
                })?;
                let upper_bound = parse_float(&bound, "Histogram bounds")?;
                let cumulative_count = parse_count(value, "Histogram bucket")?;

                if let MetricValueMarshal::Histogram(histogram) = self.series_mut(labels, timestamp)
                {
                    histogram.buckets.push(HistogramBucket {
                        upper_bound,
                        cumulative_count,
                    });
                } else {
                    unreachable!();
                }
            }
            (_, SampleKind::Sum) => {
                let sum = match self.series_mut(labels, timestamp) {
                    MetricValueMarshal::Summary(summary) => &mut summary.sum,
                    MetricValueMarshal::Histogram(histogram) => &mut histogram.sum,
                    _ => unreachable!(),
                };

                if sum.is_some() {
                    return Err(ParseError::DuplicateMetric(sample_name.to_owned()));
                }
                *sum = Some(value);
            }
            (_, SampleKind::Count) => {
                let value = parse_count(value, "Counts")?;
                let count = match self.series_mut(labels, timestamp) {
                    MetricValueMarshal::Summary(summary) => &mut summary.count,
                    MetricValueMarshal::Histogram(histogram) => &mut histogram.count,
                    _ => unreachable!(),
                };

                if count.is_some() {
                    return Err(ParseError::DuplicateMetric(sample_name.to_owned()));
                }
                *count = Some(value);
            }
            (scalar_type, SampleKind::Value) => {
                if self.metrics.iter().any(|m| m.labels == labels) {
                    return Err(ParseError::DuplicateMetric(sample_name.to_owned()));
                }

                let value = match scalar_type {
                    COUNTER => MetricValueMarshal::Counter(value),
                    GAUGE => MetricValueMarshal::Gauge(value),
                    _ => MetricValueMarshal::Untyped(value),
                };
                self.metrics.push(MetricMarshal {
                    labels,
                    timestamp,
                    value,
                });
            }
        }

        Ok(())
    }
}

impl From<MetricFamilyMarshal> for RawMetricFamily {
    fn from(marshal: MetricFamilyMarshal) -> Self {
        let type_tag = marshal.family_type().to_owned();

        RawMetricFamily {
            name: marshal.name,
            help: marshal.help.unwrap_or_default(),
            type_tag,
            metrics: marshal.metrics.into_iter().map(|m| m.into()).collect(),
        }
    }
}

/// Families in the order their first line appeared.
#[derive(Debug, Default)]
struct ExpositionMarshal {
    families: Vec<MetricFamilyMarshal>,
    by_name: HashMap<String, usize>,
}

impl ExpositionMarshal {
    fn family_mut(&mut self, name: &str) -> &mut MetricFamilyMarshal {
        let index = match self.by_name.get(name) {
            Some(index) => *index,
            None => {
                self.families.push(MetricFamilyMarshal::empty(name));
                self.by_name.insert(name.to_owned(), self.families.len() - 1);
                self.families.len() - 1
            }
        };

        &mut self.families[index]
    }

    /// Works out which family a sample belongs to. An exact name match wins, then
    /// the `_bucket`/`_sum`/`_count` series of an already declared histogram or summary.
    fn resolve<'a>(&self, sample_name: &'a str) -> (&'a str, SampleKind) {
        if self.by_name.contains_key(sample_name) {
            return (sample_name, SampleKind::Value);
        }

        for (suffix, kind, family_types) in SUFFIXES.iter() {
            if let Some(base) = sample_name.strip_suffix(suffix) {
                if let Some(index) = self.by_name.get(base) {
                    if family_types.contains(&self.families[*index].family_type()) {
                        return (base, *kind);
                    }
                }
            }
        }

        (sample_name, SampleKind::Value)
    }
}

fn take_label(labels: &mut Vec<LabelPair>, name: &str) -> Option<String> {
    let index = labels.iter().position(|l| l.name == name)?;
    Some(labels.remove(index).value)
}

fn parse_float(value: &str, what: &str) -> Result<f64, ParseError> {
    value.parse().map_err(|_| {
        ParseError::InvalidMetric(format!("{} must be numbers (got: {})", what, value))
    })
}

/// Counts are written as floats. Fractional parts are truncated.
fn parse_count(value: f64, what: &str) -> Result<u64, ParseError> {
    if value.is_finite() && value >= 0. {
        return Ok(value.trunc() as u64);
    }

    Err(ParseError::InvalidMetric(format!(
        "{} must be finite and non negative (got: {})",
        what, value
    )))
}

fn unescape(value: &str, allow_quote: bool, what: &str) -> Result<String, ParseError> {
    unescape_str(value, allow_quote).ok_or_else(|| {
        ParseError::InvalidMetric(format!("Invalid escape sequence in {}: {}", what, value))
    })
}

pub fn parse_text(exposition_text: &str) -> Result<Vec<RawMetricFamily>, ParseError> {
    use pest::iterators::Pair;

    fn parse_help(pair: Pair<Rule>, exposition: &mut ExpositionMarshal) -> Result<(), ParseError> {
        assert_eq!(pair.as_rule(), Rule::helpline);

        let mut descriptor = pair.into_inner();
        let metric_name = descriptor.next().unwrap().as_str();
        let help_text = match descriptor.next() {
            Some(docstring) => unescape(docstring.as_str(), false, "help text")?,
            None => String::new(),
        };

        exposition.family_mut(metric_name).try_add_help(help_text)
    }

    fn parse_type(pair: Pair<Rule>, exposition: &mut ExpositionMarshal) -> Result<(), ParseError> {
        assert_eq!(pair.as_rule(), Rule::typeline);

        let mut descriptor = pair.into_inner();
        let metric_name = descriptor.next().unwrap().as_str();
        let family_type = descriptor.next().unwrap().as_str();

        exposition.family_mut(metric_name).try_add_type(family_type)
    }

    fn parse_labels(pair: Pair<Rule>) -> Result<Vec<LabelPair>, ParseError> {
        assert_eq!(pair.as_rule(), Rule::labels);

        let mut labels: Vec<LabelPair> = Vec::new();
        for label in pair.into_inner() {
            let mut label = label.into_inner();
            let name = label.next().unwrap().as_str();
            let value = label.next().unwrap().as_str();

            if labels.iter().any(|l| l.name == name) {
                return Err(ParseError::InvalidMetric(format!(
                    "Found label `{}` twice in the same labelset",
                    name
                )));
            }

            labels.push(LabelPair::new(name, unescape(value, true, "label value")?));
        }

        labels.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(labels)
    }

    fn parse_sample(pair: Pair<Rule>, exposition: &mut ExpositionMarshal) -> Result<(), ParseError> {
        assert_eq!(pair.as_rule(), Rule::sample);

        let mut descriptor = pair.into_inner();
        let metric_name = descriptor.next().unwrap().as_str();

        let labels = if descriptor.peek().unwrap().as_rule() == Rule::labels {
            parse_labels(descriptor.next().unwrap())?
        } else {
            Vec::new()
        };

        let value = descriptor.next().unwrap().as_str();
        let value = parse_float(value, "Metric values")?;

        let timestamp = match descriptor.next() {
            Some(timestamp) => Some(timestamp.as_str().parse::<Timestamp>().map_err(|_| {
                ParseError::InvalidMetric(format!(
                    "Timestamp out of range (got: {})",
                    timestamp.as_str()
                ))
            })?),
            None => None,
        };

        let (family_name, kind) = exposition.resolve(metric_name);
        exposition
            .family_mut(family_name)
            .process_new_metric(metric_name, kind, labels, value, timestamp)
    }

    let exposition_pair = TextGrammar::parse(Rule::exposition, exposition_text)?
        .next()
        .unwrap();
    let mut exposition = ExpositionMarshal::default();

    assert_eq!(exposition_pair.as_rule(), Rule::exposition);

    for span in exposition_pair.into_inner() {
        match span.as_rule() {
            Rule::helpline => parse_help(span, &mut exposition)?,
            Rule::typeline => parse_type(span, &mut exposition)?,
            Rule::sample => parse_sample(span, &mut exposition)?,
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }

    Ok(exposition.families.into_iter().map(|f| f.into()).collect())
}
