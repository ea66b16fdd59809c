//! Scrapes a Prometheus text exposition endpoint and flattens it into a
//! `metric name -> [strings]` mapping.
//!
//! The pipeline is fetch, tokenize, map, flatten. [`parse`] runs all of it with
//! default settings; [`Scraper`] exposes the intermediate [`MetricFamily`] model and
//! takes a [`FetchConfig`].

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod error;
mod fetch;
mod public;
pub mod text;

#[cfg(test)]
mod test_server;
#[cfg(test)]
mod tests;

use log::debug;

pub use error::{EmptyResultError, Error, NetworkError, ParseError, Result, UnknownTypeError};
pub use fetch::{FetchConfig, Fetcher};
pub use public::*;
pub use text::{ExpositionParser, TextParser};

/// Fetches `url` and flattens its exposition.
pub fn parse(url: &str) -> Result<Flattened> {
    Scraper::new()?.parse(url)
}

/// Runs an exposition that is already in memory through the same tokenize, map and
/// flatten steps as [`parse`].
pub fn parse_exposition(exposition: &str) -> Result<Flattened> {
    let records = text::parse_text(exposition)?;
    let families = map_families(records)?;

    Ok(flatten(&families)?)
}

/// A fetcher paired with the parser for its responses. Holds no per-scrape state;
/// every call builds its own families and mapping.
#[derive(Debug, Clone)]
pub struct Scraper<P = TextParser> {
    fetcher: Fetcher,
    parser: P,
}

impl Scraper<TextParser> {
    pub fn new() -> Result<Scraper<TextParser>> {
        Scraper::with_config(FetchConfig::default())
    }

    pub fn with_config(config: FetchConfig) -> Result<Scraper<TextParser>> {
        Scraper::with_parser(config, TextParser)
    }
}

impl<P> Scraper<P>
where
    P: ExpositionParser,
{
    pub fn with_parser(config: FetchConfig, parser: P) -> Result<Scraper<P>> {
        Ok(Scraper {
            fetcher: Fetcher::new(&config)?,
            parser,
        })
    }

    /// Fetches `url` and returns its normalized metric families in document order.
    pub fn families(&self, url: &str) -> Result<Vec<MetricFamily>> {
        let records = self.fetcher.fetch_families(url, &self.parser)?;
        let families = map_families(records)?;
        debug!("mapped {} families from {}", families.len(), url);

        Ok(families)
    }

    /// Fetches `url` and flattens it. Fails with [`Error::EmptyResult`] when no
    /// family contributed an entry.
    pub fn parse(&self, url: &str) -> Result<Flattened> {
        let families = self.families(url)?;

        Ok(flatten(&families)?)
    }
}
