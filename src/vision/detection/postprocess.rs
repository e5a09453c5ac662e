// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding and non-maximum suppression

use ndarray::{s, ArrayViewD, Axis, Ix3};
use tracing::debug;

use super::detector::{DetectorError, RawDetection};
use super::preprocessing::Letterbox;

/// Default IoU above which a same-class box is suppressed
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;

/// Default cap on detections returned per frame
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

/// Candidates considered by NMS after sorting by confidence
pub const MAX_NMS_CANDIDATES: usize = 30_000;

/// Decode raw YOLOv8 predictions into candidate boxes in model input space
///
/// Accepts `[1, 4 + nc, N]` (the default export layout) or `[1, N, 4 + nc]`.
/// Each anchor keeps only its best class, and only if that score is
/// strictly above `confidence_threshold`.
pub fn decode_predictions(
    output: ArrayViewD<'_, f32>,
    num_classes: usize,
    confidence_threshold: f32,
) -> Result<Vec<RawDetection>, DetectorError> {
    let shape = output.shape().to_vec();
    let preds = output.into_dimensionality::<Ix3>().map_err(|_| {
        DetectorError::Inference(format!(
            "unexpected output shape {:?}, expected [1, {}, N]",
            shape,
            4 + num_classes
        ))
    })?;

    if shape[0] != 1 {
        return Err(DetectorError::Inference(format!(
            "unexpected batch size {} in output shape {:?}",
            shape[0], shape
        )));
    }

    let channels = 4 + num_classes;
    let preds = preds.index_axis_move(Axis(0), 0);
    let rows = if shape[1] == channels {
        preds.reversed_axes()
    } else if shape[2] == channels {
        preds
    } else {
        return Err(DetectorError::Inference(format!(
            "output shape {:?} does not match {} classes",
            shape, num_classes
        )));
    };

    let mut candidates = Vec::new();

    for row in rows.outer_iter() {
        let scores = row.slice(s![4..]);
        let (class_id, confidence) = scores.iter().copied().enumerate().fold(
            (0usize, f32::MIN),
            |best, (idx, score)| if score > best.1 { (idx, score) } else { best },
        );

        if confidence <= confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        candidates.push(RawDetection {
            class_id,
            bbox: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            confidence,
        });
    }

    debug!(
        "Decoded {} candidates above {:.2} from {} anchors",
        candidates.len(),
        confidence_threshold,
        rows.nrows()
    );

    Ok(candidates)
}

/// Class-aware greedy non-maximum suppression
///
/// Output is ordered by descending confidence and holds at most
/// `max_detections` boxes.
pub fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    candidates.truncate(MAX_NMS_CANDIDATES);

    let mut kept: Vec<RawDetection> = Vec::new();

    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }

        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold
        });

        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

/// Full post-processing: decode, suppress, and map boxes onto the frame
pub fn postprocess(
    output: ArrayViewD<'_, f32>,
    num_classes: usize,
    confidence_threshold: f32,
    iou_threshold: f32,
    max_detections: usize,
    letterbox: &Letterbox,
) -> Result<Vec<RawDetection>, DetectorError> {
    let candidates = decode_predictions(output, num_classes, confidence_threshold)?;
    let mut detections = non_max_suppression(candidates, iou_threshold, max_detections);

    for detection in &mut detections {
        detection.bbox = letterbox.restore(detection.bbox);
    }

    Ok(detections)
}
