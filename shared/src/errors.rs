//! Error types for the NutriAI client

use thiserror::Error;

/// Core error taxonomy
///
/// Every variant is recoverable: collaborator failures surface as
/// user-facing messages, persistence failures degrade to absent data,
/// and a permission refusal is a user decision, not a fault.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The generation provider returned an unparseable or
    /// schema-mismatched result. Never retried automatically.
    #[error("{0}")]
    Generation(String),

    /// The local store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Notification permission was denied; the requested mutation has
    /// been rolled back
    #[error("Notification permission was denied")]
    PermissionRefused,

    /// A chat stream terminated abnormally
    #[error("Stream error: {0}")]
    Stream(String),

    /// User input failed a required-field or range check
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// True when the error came from the generation provider
    pub fn is_generation(&self) -> bool {
        matches!(self, CoreError::Generation(_))
    }
}
