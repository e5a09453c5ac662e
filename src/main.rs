// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_detect_node::{
    api::{start_server, AppState},
    cli::NodeArgs,
    version,
    vision::YoloDetectionModel,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("Starting {}", version::get_version_string());
    tracing::debug!("Build info: {}", version::get_version_info());

    let args = NodeArgs::parse();
    let config = args.load_config()?;
    let addr = config.listen_addr()?;

    tracing::info!(
        "Loading detection model from {} (input {}x{}, {} threads)",
        config.model.model_path,
        config.model.input_size,
        config.model.input_size,
        config.model.intra_threads
    );
    let model = YoloDetectionModel::new(&config.model).await?;
    tracing::info!("Detection model ready: {} labels", model.labels().len());

    let state = AppState::new(Arc::new(model));
    tracing::info!(
        "Retaining {} labels above confidence {}",
        state.allow_list.len(),
        fabstir_detect_node::vision::detection::CONFIDENCE_THRESHOLD
    );

    start_server(addr, state, config.server.max_body_bytes).await
}
