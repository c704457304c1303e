//! Board configuration.
//!
//! Everything is read from `BOARD_*` environment variables. Parsing goes
//! through [`BoardConfig::from_lookup`] so tests can supply a map instead of
//! touching the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::departures::{DirectionFilter, MAX_DEPARTURES};

/// Default API base URL (a transport.rest instance).
pub const DEFAULT_BASE_URL: &str = "https://v6.db.transport.rest";

/// Error building a [`BoardConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime settings for fetching and rendering a departure board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Stop identifier, e.g. `"8014418"`.
    pub station_id: String,

    /// Only show departures whose direction matches.
    pub direction_filter: DirectionFilter,

    /// Base URL for the departures API.
    pub base_url: String,

    /// How far ahead the API should look (minutes).
    pub duration_mins: u32,

    /// How many results to request from the API.
    pub results: u32,

    /// How many departures to extract from the response.
    /// Values above [`MAX_DEPARTURES`] are clamped during extraction.
    pub max_results: usize,

    /// How many rows the board shows.
    pub rows: usize,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Fetch attempts before giving up.
    pub max_attempts: u32,

    /// Pause after a failed connection before retrying.
    pub retry_delay: Duration,

    /// Serve responses from `{dir}/{station_id}.json` instead of HTTP.
    pub mock_dir: Option<PathBuf>,
}

impl BoardConfig {
    /// Create a config for a station with default settings.
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            direction_filter: DirectionFilter::allow_all(),
            base_url: DEFAULT_BASE_URL.to_string(),
            duration_mins: 60,
            results: 15,
            max_results: MAX_DEPARTURES,
            rows: 3,
            timeout_secs: 15,
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            mock_dir: None,
        }
    }

    /// Set the direction filter.
    pub fn with_filter(mut self, filter: DirectionFilter) -> Self {
        self.direction_filter = filter;
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the number of rows rendered.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Set the retry policy.
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.retry_delay = retry_delay;
        self
    }

    /// Serve departures from JSON files in `dir`.
    pub fn with_mock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mock_dir = Some(dir.into());
        self
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mock_dir = get("BOARD_MOCK_DIR").map(PathBuf::from);
        let station_id = match (get("BOARD_STATION_ID"), &mock_dir) {
            (Some(id), _) => id.trim().to_string(),
            // A mock directory serves a fixed sample when no station is given.
            (None, Some(_)) => "sample".to_string(),
            (None, None) => return Err(ConfigError::Missing("BOARD_STATION_ID")),
        };

        let mut config = Self::new(station_id);
        config.mock_dir = mock_dir;

        // The filter is used verbatim; keyword trimming happens when matching.
        if let Some(filter) = lookup("BOARD_DIRECTION_FILTER") {
            config.direction_filter = DirectionFilter::new(filter);
        }
        if let Some(url) = get("BOARD_BASE_URL") {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }

        parse_into(&get, "BOARD_DURATION_MINS", &mut config.duration_mins)?;
        parse_into(&get, "BOARD_RESULTS", &mut config.results)?;
        parse_into(&get, "BOARD_MAX_RESULTS", &mut config.max_results)?;
        parse_into(&get, "BOARD_ROWS", &mut config.rows)?;
        parse_into(&get, "BOARD_TIMEOUT_SECS", &mut config.timeout_secs)?;
        parse_into(&get, "BOARD_MAX_ATTEMPTS", &mut config.max_attempts)?;

        let mut retry_secs = config.retry_delay.as_secs();
        parse_into(&get, "BOARD_RETRY_DELAY_SECS", &mut retry_secs)?;
        config.retry_delay = Duration::from_secs(retry_secs);

        if config.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "BOARD_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(config)
    }
}

/// Overwrite `target` with the parsed variable, if it is set.
fn parse_into<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = get(name) {
        *target = raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        })?;
    }
    Ok(())
}
