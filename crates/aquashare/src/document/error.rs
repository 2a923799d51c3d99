use thiserror::Error;

/// Rejection of an interchange document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found} (expected {expected})")]
    UnsupportedVersion { found: String, expected: u32 },

    #[error("invalid {path}: {reason}")]
    Invalid { path: String, reason: String },
}

impl DocumentError {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
