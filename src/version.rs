// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Detect Node

use crate::vision::detection::{ALLOWED_LABELS, CONFIDENCE_THRESHOLD};

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-yolov8-detection-2025-11-03";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 0;

/// Minor version number
pub const VERSION_MINOR: u32 = 1;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-03";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "yolov8-onnx",
    "letterbox-preprocessing",
    "class-aware-nms",
    "label-allow-list",
    "raw-body-upload",
    "http-client",
    "graceful-shutdown",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Detect Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info, including the fixed detection policy
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
        "confidence_threshold": CONFIDENCE_THRESHOLD,
        "allowed_labels": ALLOWED_LABELS,
    })
}
