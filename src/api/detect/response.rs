// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::api::errors::DetectError;

/// One retained object, in original frame pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Label from the model vocabulary
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub conf: f32,
}

/// Body of every /detect response
///
/// Serializes to either `{"success": true, "count": n, "results": [...]}`
/// or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectResponse {
    Success {
        success: bool,
        count: usize,
        results: Vec<Detection>,
    },
    Error {
        error: String,
    },
}

impl DetectResponse {
    pub fn success(results: Vec<Detection>) -> Self {
        Self::Success {
            success: true,
            count: results.len(),
            results,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { success: true, .. })
    }
}

impl From<DetectError> for DetectResponse {
    fn from(err: DetectError) -> Self {
        Self::error(err.to_string())
    }
}

impl From<Result<Vec<Detection>, DetectError>> for DetectResponse {
    fn from(result: Result<Vec<Detection>, DetectError>) -> Self {
        match result {
            Ok(results) => Self::success(results),
            Err(err) => err.into(),
        }
    }
}
