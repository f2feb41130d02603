//! Error types for the record-to-tower pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can abort a pipeline run
#[derive(Error, Debug)]
pub enum Error {
    /// Source unreachable, timed out, or answered with a non-success status
    #[error("Transport error fetching {uri}: {reason}")]
    Transport { uri: String, reason: String },

    /// Body is not a JSON array of complete records
    #[error("Failed to parse record list: {0}")]
    Parse(#[from] serde_json::Error),

    /// Mastery value with no material class
    #[error("Record {record_id} has unknown mastery level {mastery}")]
    UnknownMastery { record_id: i64, mastery: i64 },

    /// A single grade's layout pass failed
    #[error("Layout of '{grade}' failed")]
    Layout {
        grade: String,
        #[source]
        source: Box<Error>,
    },

    /// Fetch abandoned through a cancel token
    #[error("Fetch cancelled")]
    Cancelled,

    /// A wanted grade has no anchor configured
    #[error("No anchor configured for grade '{grade}'")]
    MissingAnchor { grade: String },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Renderer collaborator rejected a placement
    #[error("Renderer failed on record {record_id}: {reason}")]
    Render { record_id: i64, reason: String },
}

impl Error {
    pub(crate) fn transport(uri: &str, reason: impl ToString) -> Self {
        Error::Transport {
            uri: uri.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Id of the record that caused the failure, if one is known
    pub fn record_id(&self) -> Option<i64> {
        match self {
            Error::UnknownMastery { record_id, .. } | Error::Render { record_id, .. } => {
                Some(*record_id)
            }
            Error::Layout { source, .. } => source.record_id(),
            _ => None,
        }
    }

    /// This error followed by each of its causes, `: `-separated
    pub fn report(&self) -> String {
        let mut text = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(inner) = cause {
            text.push_str(": ");
            text.push_str(&inner.to_string());
            cause = inner.source();
        }
        text
    }
}
