// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector abstraction shared by the endpoint and the ONNX model

use thiserror::Error;

use crate::vision::Frame;

/// Minimum confidence for a candidate to be reported at all
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Errors raised by a detector while running inference
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid model input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model session lock poisoned")]
    SessionPoisoned,
}

/// One candidate produced by the model, before label filtering
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Index into the model's label vocabulary
    pub class_id: usize,
    /// Box as [x1, y1, x2, y2] in original frame pixels
    pub bbox: [f32; 4],
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

impl RawDetection {
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &RawDetection) -> f32 {
        let x1 = self.bbox[0].max(other.bbox[0]);
        let y1 = self.bbox[1].max(other.bbox[1]);
        let x2 = self.bbox[2].min(other.bbox[2]);
        let y2 = self.bbox[3].min(other.bbox[3]);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// An object detection model bound to a label vocabulary
///
/// Implementations must be safe to share across request handlers; the
/// endpoint calls `detect` from the blocking thread pool.
pub trait ObjectDetector: Send + Sync {
    /// Run detection on a frame, returning candidates whose confidence
    /// exceeds `confidence_threshold`, in the model's output order
    fn detect(
        &self,
        frame: &Frame,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, DetectorError>;

    /// Resolve a class index to its label
    fn label(&self, class_id: usize) -> Option<&str>;
}
