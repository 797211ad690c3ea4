use std::{collections::HashMap, path::PathBuf, time::Duration};

use url::Url;

use crate::errors::ConfigError;
use crate::report::ReportFormat;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: Url,
    pub api_token: Option<String>,
    pub request_timeout: Duration,
    pub report_dir: PathBuf,
    pub report_format: ReportFormat,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_map(&Self::env_values())
    }

    /// The tracked `SHOPINTEL_*` variables that are set in the environment.
    /// Callers may layer overrides on top before calling [`Self::from_map`].
    pub fn env_values() -> HashMap<String, String> {
        Self::tracked_keys()
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect()
    }

    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        fn value<'a>(values: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
            values
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        }

        let raw_url = value(values, "SHOPINTEL_API_URL").unwrap_or(DEFAULT_API_URL);
        let api_url = parse_api_url(raw_url)?;

        let request_timeout = match value(values, "SHOPINTEL_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw.to_string())),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let report_format = match value(values, "SHOPINTEL_REPORT_FORMAT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidReportFormat(raw.to_string()))?,
            None => ReportFormat::default(),
        };

        Ok(Self {
            api_url,
            api_token: value(values, "SHOPINTEL_API_TOKEN").map(str::to_string),
            request_timeout,
            report_dir: PathBuf::from(value(values, "SHOPINTEL_REPORT_DIR").unwrap_or(".")),
            report_format,
        })
    }

    fn tracked_keys() -> [&'static str; 5] {
        [
            "SHOPINTEL_API_URL",
            "SHOPINTEL_API_TOKEN",
            "SHOPINTEL_TIMEOUT_SECS",
            "SHOPINTEL_REPORT_DIR",
            "SHOPINTEL_REPORT_FORMAT",
        ]
    }

    /// Absolute URL of an API path, e.g. `endpoint("datasets/upload")`.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        self.api_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ConfigError::InvalidUrl {
                value: path.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Base URLs always end in `/` so relative joins keep the path prefix.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized).map_err(|err| ConfigError::InvalidUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}
