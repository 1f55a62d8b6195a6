use crate::config::FetchPolicy;
use crate::error::ExtractError;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::warn;

/// Transient statuses worth another attempt; everything else propagates
/// immediately, transport errors included.
const RETRYABLE: &[StatusCode] = &[
    StatusCode::REQUEST_TIMEOUT,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

pub fn build_client(policy: &FetchPolicy) -> Result<Client, ExtractError> {
    Client::builder()
        .timeout(Duration::from_secs(policy.timeout_secs))
        .user_agent(&policy.user_agent)
        .build()
        .map_err(|err| ExtractError::Configuration(format!("failed to build http client: {err}")))
}

pub fn fetch_text(
    client: &Client,
    policy: &FetchPolicy,
    url: &str,
) -> Result<String, ExtractError> {
    let response = execute_with_retry(policy, url, || client.get(url))?;
    response.text().map_err(|err| ExtractError::Fetch {
        url: url.to_string(),
        reason: format!("failed to read body: {err}"),
    })
}

/// Runs the request up to the policy's attempt budget with a linearly
/// growing delay. The builder closure is re-invoked per attempt because a
/// request builder is consumed on send.
pub fn execute_with_retry<F>(
    policy: &FetchPolicy,
    url: &str,
    build: F,
) -> Result<Response, ExtractError>
where
    F: Fn() -> RequestBuilder,
{
    let attempts = policy.retry_attempts.max(1);

    for attempt in 1..=attempts {
        let response = build().send().map_err(|err| ExtractError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }
        if !RETRYABLE.contains(&status) || attempt == attempts {
            return Err(ExtractError::Fetch {
                url: url.to_string(),
                reason: format!("status {status} after {attempt} attempt(s)"),
            });
        }

        warn!(%url, %status, attempt, "transient status; retrying");
        std::thread::sleep(Duration::from_millis(
            u64::from(attempt) * policy.retry_delay_ms,
        ));
    }

    Err(ExtractError::Fetch {
        url: url.to_string(),
        reason: "retry budget exhausted".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_statuses_are_retryable() {
        assert!(RETRYABLE.contains(&StatusCode::SERVICE_UNAVAILABLE));
        assert!(RETRYABLE.contains(&StatusCode::REQUEST_TIMEOUT));
        assert!(!RETRYABLE.contains(&StatusCode::NOT_FOUND));
        assert!(!RETRYABLE.contains(&StatusCode::FORBIDDEN));
        assert!(!RETRYABLE.contains(&StatusCode::TOO_MANY_REQUESTS));
    }
}
