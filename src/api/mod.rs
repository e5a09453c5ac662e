// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod http_server;

pub use detect::{detect_handler, detect_objects, DetectResponse, Detection};
pub use errors::DetectError;
pub use http_server::{create_app, serve, start_server, AppState};
