//! Client error types
use thiserror::Error;

use defects_core::{ValidationError, WorkflowError};
use defects_media::MediaError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not signed in. Run 'defects auth login' first")]
    NotAuthenticated,

    #[error("Session expired. Please sign in again")]
    SessionExpired,

    #[error("{0}")]
    Forbidden(String),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Image(#[from] MediaError),

    /// A screen-level failure carrying the message shown to the user
    #[error("{message}")]
    Screen {
        message: String,
        #[source]
        source: Box<ClientError>,
    },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ClientError {
    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }

    /// Wrap this error with the message a screen shows for it
    pub fn on_screen(self, fallback: &str) -> Self {
        match self {
            // already carries its final message
            ClientError::Screen { .. } => self,
            other => ClientError::Screen {
                message: other.user_message(fallback),
                source: Box::new(other),
            },
        }
    }

    /// The message to show: server payload, local rule text, or the fallback
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Authentication(message) | ClientError::Forbidden(message) => {
                message.clone()
            }
            ClientError::NotAuthenticated | ClientError::SessionExpired => self.to_string(),
            ClientError::Validation(errors) if !errors.is_empty() => join_messages(errors),
            ClientError::Workflow(err) => err.to_string(),
            ClientError::Image(err) if err.is_rejected_upload() => err.to_string(),
            ClientError::Screen { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Check if this is a network-related error
    pub fn is_network_error(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Screen { source, .. } => source.is_network_error(),
            _ => false,
        }
    }

    /// Check if the user has to sign in again
    pub fn is_auth_error(&self) -> bool {
        match self {
            ClientError::Authentication(_)
            | ClientError::NotAuthenticated
            | ClientError::SessionExpired => true,
            ClientError::Screen { source, .. } => source.is_auth_error(),
            _ => false,
        }
    }

    /// HTTP status of a server error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Screen { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(vec![err])
    }
}
