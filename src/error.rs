use std::time::Duration;

use thiserror::Error;

pub use crate::text::ParseError;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a scrape. Each stage's error converts into this with `?`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),
    #[error(transparent)]
    EmptyResult(#[from] EmptyResultError),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {code}, expected 200")]
    Status { url: String, code: u16 },
    #[error("request to {url} cancelled after {timeout:?}")]
    Cancelled { url: String, timeout: Duration },
}

impl NetworkError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Client(_) | Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    /// The HTTP status, for `Status` errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("metric family {family} has unknown type `{type_tag}`")]
pub struct UnknownTypeError {
    pub family: String,
    pub type_tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("exposition produced no flattenable metrics")]
pub struct EmptyResultError;
