use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use defects_client::{ClientConfig, ClientError, SessionStore};
use defects_config::constants::{
    DEFECTS_API_URL, DEFECTS_HTTP_TIMEOUT_SECS, DEFECTS_PAGE_SIZE, DEFECTS_SESSION_PATH,
    DEFECTS_STRICT_TRANSITIONS,
};
use defects_config::{DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_PAGE_SIZE};
use defects_core::pagination::MAX_PAGE_SIZE;
use defects_core::TransitionPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid HTTP timeout: {0}")]
    InvalidTimeout(#[source] ParseIntError),
    #[error("HTTP timeout must be at least 1 second")]
    TimeoutOutOfRange,
    #[error("Invalid page size: {0}")]
    InvalidPageSize(#[source] ParseIntError),
    #[error("Page size {0} is out of valid range (1-{max})", max = MAX_PAGE_SIZE)]
    PageSizeOutOfRange(usize),
    #[error("Invalid value for {name}: {value} (expected true or false)")]
    InvalidFlag { name: &'static str, value: String },
    #[error("API URL must start with http:// or https://: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Overrides `~/.defects/session.toml`
    pub session_path: Option<PathBuf>,
    pub strict_transitions: bool,
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; unset and blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_url = get(DEFECTS_API_URL)
            .map(|url| url.trim().to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let timeout_secs = match get(DEFECTS_HTTP_TIMEOUT_SECS) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(ConfigError::InvalidTimeout)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(ConfigError::TimeoutOutOfRange);
        }

        let page_size = match get(DEFECTS_PAGE_SIZE) {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(ConfigError::InvalidPageSize)?,
            None => DEFAULT_PAGE_SIZE,
        };
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::PageSizeOutOfRange(page_size));
        }

        let strict_transitions = match get(DEFECTS_STRICT_TRANSITIONS) {
            Some(value) => parse_flag(DEFECTS_STRICT_TRANSITIONS, &value)?,
            None => false,
        };

        Ok(Config {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            session_path: get(DEFECTS_SESSION_PATH).map(PathBuf::from),
            strict_transitions,
            page_size,
        })
    }

    pub fn policy(&self) -> TransitionPolicy {
        if self.strict_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::RoleOnly
        }
    }

    /// Client settings, resolving the default session location when none is set
    pub fn client_config(&self) -> Result<ClientConfig, ClientError> {
        let session_path = match &self.session_path {
            Some(path) => path.clone(),
            None => SessionStore::default_location()?.path().to_path_buf(),
        };
        Ok(ClientConfig::new(&self.api_url)
            .with_timeout(self.timeout)
            .with_session_path(session_path))
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
