// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP client for a running detection node
//!
//! Posts raw encoded frames to `/detect` and unpacks the JSON envelope.

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::api::{DetectResponse, Detection};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default endpoint for a node on the local machine
pub const DEFAULT_DETECT_URL: &str = "http://127.0.0.1:8000/detect";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("input data is empty")]
    EmptyInput,

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("detection service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("detection rejected: {0}")]
    Rejected(String),
}

pub struct DetectClient {
    client: Client,
    endpoint: String,
}

impl DetectClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        debug!(
            "Detect client configured: endpoint={}, timeout={:?}",
            endpoint, timeout
        );

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Client with the default 5 second timeout
    pub fn with_default_timeout(endpoint: &str) -> Result<Self, ClientError> {
        Self::new(endpoint, DEFAULT_TIMEOUT)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one encoded image and return the retained detections
    pub async fn detect(&self, data: &[u8]) -> Result<Vec<Detection>, ClientError> {
        if data.is_empty() {
            return Err(ClientError::EmptyInput);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }
}

/// Unpack a /detect response body
pub fn parse_response(body: &[u8]) -> Result<Vec<Detection>, ClientError> {
    match serde_json::from_slice::<DetectResponse>(body)? {
        DetectResponse::Success {
            success: true,
            results,
            ..
        } => Ok(results),
        DetectResponse::Success { .. } => {
            Err(ClientError::Rejected("success flag not set".to_string()))
        }
        DetectResponse::Error { error } => Err(ClientError::Rejected(error)),
    }
}
