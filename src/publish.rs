use crate::config::FetchPolicy;
use crate::error::ExtractError;
use crate::fetch;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Saved,
    SkippedMissingId,
}

/// PUT the document to `{endpoint}/{id}`. No configured id means the job
/// ran for its report only; that is logged, not failed.
pub fn publish_document(
    client: &Client,
    policy: &FetchPolicy,
    endpoint: &str,
    document_id: Option<&str>,
    document: &Value,
) -> Result<PublishOutcome, ExtractError> {
    let Some(document_id) = document_id.filter(|id| !id.is_empty()) else {
        info!("skipping publish; no document id configured");
        return Ok(PublishOutcome::SkippedMissingId);
    };

    let url = format!("{}/{document_id}", endpoint.trim_end_matches('/'));
    let response = fetch::execute_with_retry(policy, &url, || client.put(&url).json(document))
        .map_err(|err| match err {
            ExtractError::Fetch { url, reason } => ExtractError::Publish {
                document_id: document_id.to_string(),
                reason: format!("{url}: {reason}"),
            },
            other => other,
        })?;

    info!(status = %response.status(), document_id, "published document");
    Ok(PublishOutcome::Saved)
}
