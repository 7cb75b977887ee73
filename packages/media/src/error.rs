//! Media error types
use thiserror::Error;

use crate::MAX_UPLOAD_MB;

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Please select a valid image file")]
    NotAnImage,

    #[error("Image must be under {}MB", MAX_UPLOAD_MB)]
    TooLarge { size: u64 },

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not encode image: {0}")]
    Encode(String),

    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// True for errors the user can fix by choosing another file
    pub fn is_rejected_upload(&self) -> bool {
        matches!(self, MediaError::NotAnImage | MediaError::TooLarge { .. })
    }
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for MediaError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidDataUri(err.to_string())
    }
}
