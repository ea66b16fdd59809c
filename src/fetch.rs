use std::time::Duration;

use log::debug;
use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, ACCEPT},
    StatusCode,
};

use crate::error::{NetworkError, Result};
use crate::text::{ExpositionParser, RawMetricFamily};

const TEXT_FORMAT: &str = "text/plain;version=0.0.4;q=1.0,*/*;q=0.1";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Upper bound for the whole request. When it runs out the scrape fails with
    /// [`NetworkError::Cancelled`]. `None` leaves the client's default in place.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            timeout: None,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Blocking HTTP client for exposition endpoints. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Option<Duration>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> std::result::Result<Fetcher, NetworkError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(TEXT_FORMAT));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(NetworkError::Client)?;

        Ok(Fetcher {
            client,
            timeout: config.timeout,
        })
    }

    /// Returns the full body of a 200 response.
    pub fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, NetworkError> {
        debug!("fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| self.transport_error(url, err))?;

        let status = response.status();
        debug!("{} answered {}", url, status);
        if status != StatusCode::OK {
            return Err(NetworkError::Status {
                url: url.to_owned(),
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .map_err(|err| self.transport_error(url, err))?;
        debug!("read {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }

    /// Fetches `url` and tokenizes the body with `parser`.
    pub fn fetch_families<P>(&self, url: &str, parser: &P) -> Result<Vec<RawMetricFamily>>
    where
        P: ExpositionParser,
    {
        let body = self.fetch(url)?;
        let families = parser.parse(&body)?;
        debug!("{} exposes {} metric families", url, families.len());

        Ok(families)
    }

    fn transport_error(&self, url: &str, err: reqwest::Error) -> NetworkError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => NetworkError::Cancelled {
                url: url.to_owned(),
                timeout,
            },
            _ => NetworkError::Transport {
                url: url.to_owned(),
                source: err,
            },
        }
    }
}
