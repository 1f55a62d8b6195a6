use thiserror::Error;

/// Failure kinds a job run can end with; the process boundary maps the kind
/// to an exit code.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("structural parse failure: {0}")]
    Structure(String),

    #[error("no qualifying rows: {0}")]
    EmptyResult(String),

    #[error("publish failed for document {document_id}: {reason}")]
    Publish { document_id: String, reason: String },
}

impl ExtractError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractError::Configuration(_) => 2,
            ExtractError::EmptyResult(_) => 0,
            ExtractError::Fetch { .. }
            | ExtractError::Structure { .. }
            | ExtractError::Publish { .. } => 1,
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        ExtractError::Structure(message.into())
    }
}
