//! Client-side error type
//!
//! Wraps the shared core taxonomy plus the infrastructure failures the
//! client can hit (HTTP, IO, configuration). Collaborator failures are
//! converted to component-local state at the call site; this type is
//! what crosses those call sites.

use nutriai_shared::CoreError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Message suitable for direct display to the user
    ///
    /// Generation errors already carry their user-facing wording;
    /// infrastructure failures collapse to a generic line so internal
    /// details never reach the screen.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Core(CoreError::Generation(msg)) => msg.clone(),
            ClientError::Core(CoreError::PermissionRefused) => {
                "Notification permission was not granted.".to_string()
            }
            ClientError::Core(CoreError::Stream(_)) => {
                "The conversation was interrupted. Please try again.".to_string()
            }
            ClientError::Core(CoreError::Validation(msg)) => msg.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}
