// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::vision::{DetectorError, ImageError};

/// Failure kinds reported by the /detect endpoint
///
/// None of these are fatal: each one becomes a `{"error": ...}` body for
/// the request that caused it. The `Display` text is the exact message
/// sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("no image data received")]
    EmptyInput,

    #[error("image decoding failed")]
    DecodeFailure,

    #[error("internal server error: {0}")]
    Internal(String),
}

impl DetectError {
    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            DetectError::EmptyInput => "empty_input",
            DetectError::DecodeFailure => "decode_failure",
            DetectError::Internal(_) => "internal",
        }
    }
}

impl From<ImageError> for DetectError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::EmptyData => DetectError::EmptyInput,
            ImageError::UnsupportedFormat | ImageError::DecodeFailed(_) => {
                DetectError::DecodeFailure
            }
        }
    }
}

impl From<DetectorError> for DetectError {
    fn from(err: DetectorError) -> Self {
        DetectError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for DetectError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            let payload = err.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "detection task panicked".to_string());
            DetectError::Internal(message)
        } else {
            DetectError::Internal(err.to_string())
        }
    }
}
