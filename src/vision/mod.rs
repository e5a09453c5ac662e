// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based object detection
//!
//! This module provides:
//! - Frame decoding from raw request bytes
//! - Object detection via a YOLOv8 ONNX model

pub mod detection;
pub mod image_utils;

pub use detection::{AllowList, DetectorError, ObjectDetector, RawDetection, YoloDetectionModel};
pub use image_utils::{decode_frame, detect_format, Frame, ImageError, ImageInfo};
