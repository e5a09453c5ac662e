// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection model
//!
//! Wraps an ONNX Runtime session for a YOLOv8 export and turns its raw
//! output into frame-space detections.

use anyhow::{Context, Result};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::detector::{DetectorError, ObjectDetector, RawDetection};
use super::labels::LabelMap;
use super::postprocess::postprocess;
use super::preprocessing::preprocess_for_detection;
use crate::config::ModelConfig;
use crate::vision::Frame;

/// YOLOv8 detection model
///
/// Runs on CPU. The session is shared behind a mutex, so concurrent
/// requests are serialized at inference time.
#[derive(Clone)]
pub struct YoloDetectionModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Class index to label mapping
    labels: LabelMap,
    /// Square input size the model was exported with
    input_size: u32,
    /// IoU threshold for non-maximum suppression
    iou_threshold: f32,
    /// Maximum detections per frame
    max_detections: usize,
}

impl std::fmt::Debug for YoloDetectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetectionModel")
            .field("input_name", &self.input_name)
            .field("num_classes", &self.labels.len())
            .field("input_size", &self.input_size)
            .field("iou_threshold", &self.iou_threshold)
            .field("max_detections", &self.max_detections)
            .finish_non_exhaustive()
    }
}

impl YoloDetectionModel {
    /// Load the detection model described by `config`
    ///
    /// Labels come from `config.labels_path` when set, otherwise the
    /// COCO vocabulary is used.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or labels file not found
    /// - ONNX Runtime initialization fails
    pub async fn new(config: &ModelConfig) -> Result<Self> {
        let labels = match config.labels_path {
            Some(ref path) => LabelMap::from_file(path)?,
            None => LabelMap::coco(),
        };

        Self::with_labels(&config.model_path, labels, config)
    }

    /// Load the model with an explicit label vocabulary
    pub fn with_labels<P: AsRef<Path>>(
        model_path: P,
        labels: LabelMap,
        config: &ModelConfig,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!(
            "Detection model loaded - input: {}, classes: {}",
            input_name,
            labels.len()
        );

        info!(
            "✅ Detection model loaded ({} classes, {}x{} input, CPU-only)",
            labels.len(),
            config.input_size,
            config.input_size
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels,
            input_size: config.input_size,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
        })
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }
}

impl ObjectDetector for YoloDetectionModel {
    fn detect(
        &self,
        frame: &Frame,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(DetectorError::InvalidInput("frame has no pixels".to_string()));
        }

        let (input, letterbox) = preprocess_for_detection(frame, self.input_size);

        let input_value = Value::from_array(input)
            .map_err(|e| DetectorError::Inference(format!("failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectorError::SessionPoisoned)?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| DetectorError::Inference(format!("failed to extract output: {}", e)))?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        let detections = postprocess(
            output_tensor,
            self.labels.len(),
            confidence_threshold,
            self.iou_threshold,
            self.max_detections,
            &letterbox,
        )?;

        Ok(detections)
    }

    fn label(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id)
    }
}
