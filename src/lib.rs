// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod version;
pub mod vision;

pub use api::{create_app, AppState, DetectError, DetectResponse, Detection};
pub use client::{ClientError, DetectClient};
pub use config::{ConfigError, DetectConfig, ModelConfig, ServerConfig};
pub use vision::{AllowList, ObjectDetector, RawDetection, YoloDetectionModel};
