// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label vocabulary for the detection model

use anyhow::{Context, Result};
use std::path::Path;

/// COCO class names in YOLOv8 output order
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Mapping from class index to label string
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap {
    labels: Vec<String>,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::coco()
    }
}

impl LabelMap {
    /// The 80 COCO labels the stock YOLOv8 weights are trained on
    pub fn coco() -> Self {
        Self::from_labels(COCO_CLASSES)
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Load labels from a text file, one label per line
    ///
    /// Surrounding whitespace is trimmed and blank lines are skipped, so
    /// line N of the non-blank lines is class index N.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read labels file {}", path.display()))?;

        let map = Self::parse(&content);
        if map.is_empty() {
            anyhow::bail!("Labels file {} contains no labels", path.display());
        }

        Ok(map)
    }

    fn parse(content: &str) -> Self {
        Self::from_labels(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
