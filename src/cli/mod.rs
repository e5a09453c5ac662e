// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{DetectClient, DEFAULT_DETECT_URL};
use crate::config::DetectConfig;

/// Fabstir Detect Node server options
#[derive(Parser, Debug, Default)]
#[command(name = "fabstir-detect-node")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Object detection service: POST an image to /detect", long_about = None)]
pub struct NodeArgs {
    /// TOML config file
    #[arg(long, env = "DETECT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long, env = "DETECT_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Path to the YOLOv8 ONNX model
    #[arg(long, env = "DETECT_MODEL_PATH")]
    pub model_path: Option<String>,

    /// Label file, one label per line (COCO when omitted)
    #[arg(long, env = "DETECT_LABELS_PATH")]
    pub labels_path: Option<String>,
}

impl NodeArgs {
    /// Defaults, then the config file, then flags / env
    pub fn load_config(&self) -> Result<DetectConfig> {
        let mut config = match &self.config {
            Some(path) => DetectConfig::from_file(path)?,
            None => DetectConfig::default(),
        };

        if let Some(addr) = &self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(path) = &self.model_path {
            config.model.model_path = path.clone();
        }
        if let Some(path) = &self.labels_path {
            config.model.labels_path = Some(path.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

/// Send an image to a detection node and print what it found
#[derive(Parser, Debug)]
#[command(name = "detect-cli")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Send an image to a Fabstir Detect Node", long_about = None)]
pub struct DetectCli {
    /// Image file to send
    pub image: PathBuf,

    /// Detection endpoint
    #[arg(long, env = "DETECT_URL", default_value = DEFAULT_DETECT_URL)]
    pub url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

/// Execute CLI command
pub async fn execute(cli: DetectCli) -> Result<()> {
    let data = tokio::fs::read(&cli.image)
        .await
        .with_context(|| format!("Failed to read image {}", cli.image.display()))?;

    let client = DetectClient::new(&cli.url, Duration::from_secs(cli.timeout_secs))?;
    let detections = client.detect(&data).await?;

    println!("{}", serde_json::to_string_pretty(&detections)?);
    Ok(())
}
