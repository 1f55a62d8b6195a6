use crate::error::ExtractError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use url::Url;

pub const DEFAULT_PUBLISH_ENDPOINT: &str = "https://jsonblob.com/api/jsonBlob";

const TIMEOUT_ENV: &str = "FETCH_TIMEOUT_SECS";
const ATTEMPTS_ENV: &str = "FETCH_RETRY_ATTEMPTS";
const DELAY_ENV: &str = "FETCH_RETRY_DELAY_MS";
const ENDPOINT_ENV: &str = "JSON_BLOB_ENDPOINT";

/// Retry and timeout budget shared by every fetch and publish call.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout_secs: u64,
    pub retry_attempts: u8,
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            user_agent: concat!("paisa/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub fetch: FetchPolicy,
    pub publish_endpoint: String,
}

impl AppConfig {
    /// Reads overrides from the process environment; a `.env` file in the
    /// working directory is honored first.
    pub fn from_env() -> Result<Self, ExtractError> {
        dotenvy::dotenv().ok();

        let mut fetch = FetchPolicy::default();
        if let Some(timeout_secs) = parse_env(TIMEOUT_ENV)? {
            fetch.timeout_secs = timeout_secs;
        }
        if let Some(retry_attempts) = parse_env(ATTEMPTS_ENV)? {
            fetch.retry_attempts = retry_attempts;
        }
        if let Some(retry_delay_ms) = parse_env(DELAY_ENV)? {
            fetch.retry_delay_ms = retry_delay_ms;
        }

        let publish_endpoint = env_nonempty(ENDPOINT_ENV)
            .unwrap_or_else(|| DEFAULT_PUBLISH_ENDPOINT.to_string());

        Ok(Self {
            fetch,
            publish_endpoint,
        })
    }
}

/// Source URL for a job: the environment wins, then the job's built-in
/// page if it has one. The result must be an absolute URL.
pub fn source_url(url_env: &str, default_url: Option<&str>) -> Result<String, ExtractError> {
    let url = env_nonempty(url_env)
        .or_else(|| default_url.map(str::to_string))
        .ok_or_else(|| {
            ExtractError::Configuration(format!(
                "{url_env} is not set and the job has no built-in source"
            ))
        })?;
    Url::parse(&url).map_err(|err| {
        ExtractError::Configuration(format!("{url_env} is not a valid URL: {err}"))
    })?;
    Ok(url)
}

/// Document id for a job's publish target; absence means publishing is
/// skipped, never an error.
pub fn document_id(blob_env: &str) -> Option<String> {
    env_nonempty(blob_env)
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T>(name: &str) -> Result<Option<T>, ExtractError>
where
    T: FromStr,
    T::Err: Display,
{
    match env_nonempty(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|err| ExtractError::Configuration(format!("{name} is not valid: {err}"))),
        None => Ok(None),
    }
}
