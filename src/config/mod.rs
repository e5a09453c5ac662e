// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Defaults, overridden by an optional TOML file, overridden in turn by
//! CLI flags / environment variables (`cli::NodeArgs`). The confidence
//! threshold and label allow-list are compile-time constants.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::vision::detection::postprocess::{DEFAULT_IOU_THRESHOLD, DEFAULT_MAX_DETECTIONS};
use crate::vision::detection::DETECTION_INPUT_SIZE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub listen_addr: String,
    /// Largest request body accepted by the transport layer
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Detection model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the YOLOv8 ONNX export
    pub model_path: String,
    /// Optional label file (one label per line); COCO when absent
    pub labels_path: Option<String>,
    /// Square input size the model was exported with
    pub input_size: u32,
    /// IoU threshold for non-maximum suppression
    pub iou_threshold: f32,
    /// Maximum detections per frame
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/yolov8n.onnx".to_string(),
            labels_path: None,
            input_size: DETECTION_INPUT_SIZE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

impl DetectConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .listen_addr
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                field: "server.listen_addr".to_string(),
                message: e.to_string(),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if self.server.max_body_bytes == 0 {
            return Err(invalid("server.max_body_bytes", "must be at least 1"));
        }

        if self.model.model_path.trim().is_empty() {
            return Err(invalid("model.model_path", "must not be empty"));
        }

        if self.model.input_size == 0 || self.model.input_size % 32 != 0 {
            return Err(invalid(
                "model.input_size",
                &format!("{} is not a positive multiple of 32", self.model.input_size),
            ));
        }

        if !(self.model.iou_threshold > 0.0 && self.model.iou_threshold <= 1.0) {
            return Err(invalid(
                "model.iou_threshold",
                &format!("{} is outside (0, 1]", self.model.iou_threshold),
            ));
        }

        if self.model.max_detections == 0 {
            return Err(invalid("model.max_detections", "must be at least 1"));
        }

        if self.model.intra_threads == 0 {
            return Err(invalid("model.intra_threads", "must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}
