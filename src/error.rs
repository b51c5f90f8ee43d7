// ⚠️ Scoring Errors
// Failures that can escape a collaborator call or configuration load

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Any failure reported by the revision source or entity lookup
    #[error("Revision source error on {wiki}: {message}")]
    Source { wiki: String, message: String },

    #[error("Revision not found: {wiki} rev {revid}")]
    RevisionNotFound { wiki: String, revid: u64 },

    #[error("Page has no revisions: {wiki} {title}")]
    PageNotFound { wiki: String, title: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn collaborator(wiki: &str, message: impl Into<String>) -> Self {
        ScoringError::Source {
            wiki: wiki.to_string(),
            message: message.into(),
        }
    }
}

pub type ScoringResult<T> = std::result::Result<T, ScoringError>;
