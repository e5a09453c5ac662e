// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /detect for finding allow-listed objects in an image.

pub mod handler;
pub mod response;

pub use handler::{detect_handler, detect_objects, filter_detections};
pub use response::{DetectResponse, Detection};
