// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection for the /detect endpoint
//!
//! Components:
//! - `detector` - `ObjectDetector` trait and candidate type
//! - `model` - YOLOv8 ONNX model
//! - `preprocessing` - Letterbox resize and tensor layout
//! - `postprocess` - Prediction decoding and NMS
//! - `labels` - Class index to label vocabulary
//! - `allow_list` - Labels the endpoint reports

pub mod allow_list;
pub mod detector;
pub mod labels;
pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use allow_list::{AllowList, ALLOWED_LABELS};
pub use detector::{DetectorError, ObjectDetector, RawDetection, CONFIDENCE_THRESHOLD};
pub use labels::{LabelMap, COCO_CLASSES};
pub use model::YoloDetectionModel;
pub use preprocessing::{Letterbox, DETECTION_INPUT_SIZE};
