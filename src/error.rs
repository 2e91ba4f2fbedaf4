use thiserror::Error;

/// Errors surfaced by the desk. User-facing variants are turned into
/// notices before they reach the UI.
#[derive(Debug, Error)]
pub enum DeskError {
    /// A required form field is missing. Raised before any side effect.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    /// A remote save or read failed. Carries the server message when one
    /// was returned.
    #[error("{0}")]
    Remote(String),

    #[error("Maximum {max} dialogs can be open at a time.")]
    Capacity { max: usize },

    #[error("draft store error: {0}")]
    Io(#[from] std::io::Error),

    #[error("draft serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeskError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
