//! Tokenizer for the Prometheus text exposition format. Turns a scraped document
//! into [`RawMetricFamily`] records without interpreting the declared types.

mod model;
mod parsers;
mod utils;


pub use model::*;
pub use parsers::{parse_text, ParseError, Rule, COUNTER, GAUGE, HISTOGRAM, SUMMARY, UNTYPED};
pub use utils::format_float;

/// Turns the body of a scrape into raw metric families.
///
/// Implementations hold no state between calls, so one value can serve any number
/// of concurrent scrapes.
pub trait ExpositionParser {
    fn parse(&self, exposition: &[u8]) -> Result<Vec<RawMetricFamily>, ParseError>;
}

/// The text format (version 0.0.4) parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextParser;

impl ExpositionParser for TextParser {
    fn parse(&self, exposition: &[u8]) -> Result<Vec<RawMetricFamily>, ParseError> {
        let text = std::str::from_utf8(exposition)?;
        parse_text(text)
    }
}
