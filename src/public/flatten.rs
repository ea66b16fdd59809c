use std::collections::HashMap;

use super::model::{MetricFamily, MetricValue};
use crate::error::EmptyResultError;

/// Metric name to the strings its series contributed.
pub type Flattened = HashMap<String, Vec<String>>;

/// Projects families onto the legacy `name -> [strings]` shape.
///
/// Simple series contribute their label values (ordered by label name) followed by
/// their value, summaries contribute only their sum, and histograms contribute
/// nothing. A document that yields no entry at all is reported as
/// [`EmptyResultError`] instead of an empty map.
pub fn flatten(families: &[MetricFamily]) -> Result<Flattened, EmptyResultError> {
    let mut result = Flattened::new();

    for family in families {
        for metric in family.metrics.iter() {
            match metric {
                MetricValue::Simple(simple) => {
                    let entry = result.entry(family.name.clone()).or_default();
                    entry.extend(simple.labels.values().cloned());
                    entry.push(simple.value.clone());
                }
                MetricValue::Summary(summary) => {
                    result
                        .entry(family.name.clone())
                        .or_default()
                        .push(summary.sum.clone());
                }
                // Histograms have no legacy projection.
                MetricValue::Histogram(_) => {}
            }
        }
    }

    if result.is_empty() {
        return Err(EmptyResultError);
    }

    Ok(result)
}
