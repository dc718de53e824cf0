//! Codec error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding, resizing or encoding an image.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Resize failed: {0}")]
    ResizeFailed(String),

    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed {
        format: &'static str,
        message: String,
    },
}

impl CodecError {
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed(message.into())
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        Self::ResizeFailed(message.into())
    }

    pub fn encode_failed(format: &'static str, message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            format,
            message: message.into(),
        }
    }
}
