//! HTTP departures client.
//!
//! Queries a transport.rest-style API:
//! `GET {base}/stops/{station}/departures?duration=60&results=15`.
//! Failed attempts are retried up to the configured limit; connection
//! errors wait `retry_delay` first, error statuses retry straight away.
//! Bodies larger than [`MAX_BODY_BYTES`] are refused rather than buffered.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::config::BoardConfig;

use super::DepartureSource;
use super::error::SourceError;

/// Largest response body read into memory (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Departures API client for a single station.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    url: Url,
    max_attempts: u32,
    retry_delay: Duration,
}

impl HttpSource {
    /// Create a client for the station in `config`.
    pub fn new(config: &BoardConfig) -> Result<Self, SourceError> {
        let url = departures_url(config)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("departure-board/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            url,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// The full request URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_once(&self) -> Result<String, SourceError> {
        let mut response = self.http.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let too_large = || SourceError::TooLarge {
            limit: MAX_BODY_BYTES,
        };
        if response
            .content_length()
            .is_some_and(|len| len > MAX_BODY_BYTES as u64)
        {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong, so count as we read.
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > MAX_BODY_BYTES {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl DepartureSource for HttpSource {
    async fn fetch_body(&self) -> Result<String, SourceError> {
        let mut attempt = 1;
        loop {
            debug!(attempt, max_attempts = self.max_attempts, url = %self.url, "fetching departures");

            let err = match self.fetch_once().await {
                Ok(body) => {
                    debug!(bytes = body.len(), "received departures");
                    return Ok(body);
                }
                Err(err) => err,
            };

            if attempt >= self.max_attempts || !err.is_retryable() {
                return Err(err);
            }
            warn!(attempt, error = %err, "departures request failed, retrying");

            if matches!(err, SourceError::Http(_)) && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
            attempt += 1;
        }
    }
}

/// Build the departures URL for the configured station.
fn departures_url(config: &BoardConfig) -> Result<Url, SourceError> {
    let mut url =
        Url::parse(&config.base_url).map_err(|e| SourceError::Config(format!("{e}")))?;

    url.path_segments_mut()
        .map_err(|_| SourceError::Config(format!("cannot use {} as a base URL", config.base_url)))?
        .pop_if_empty()
        .extend(["stops", config.station_id.as_str(), "departures"]);

    url.query_pairs_mut()
        .append_pair("duration", &config.duration_mins.to_string())
        .append_pair("results", &config.results.to_string());

    Ok(url)
}
