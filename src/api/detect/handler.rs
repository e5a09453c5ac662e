// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use bytes::Bytes;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::response::{Detection, DetectResponse};
use crate::api::errors::DetectError;
use crate::api::http_server::AppState;
use crate::vision::detection::CONFIDENCE_THRESHOLD;
use crate::vision::{decode_frame, AllowList, ObjectDetector, RawDetection};

/// POST /detect - Detect allow-listed objects in an image
///
/// The request body is the encoded image itself, in any container the
/// `image` crate can sniff (PNG, JPEG, WebP, GIF, BMP, TIFF, PNM, ...);
/// no content type is required.
///
/// # Response
/// Always HTTP 200 with one of:
/// - `{"success": true, "count": n, "results": [{x1, y1, x2, y2, label, conf}, ...]}`
/// - `{"error": "no image data received"}`
/// - `{"error": "image decoding failed"}`
/// - `{"error": "internal server error: <detail>"}`
pub async fn detect_handler(State(state): State<AppState>, body: Bytes) -> Json<DetectResponse> {
    let start = Instant::now();
    let payload_bytes = body.len();

    let result = run_detection(&state, body).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(results) => info!(
            "Detection complete: {} objects retained, {} bytes, {}ms",
            results.len(),
            payload_bytes,
            elapsed_ms
        ),
        Err(e) => warn!(
            kind = e.kind(),
            "Detection failed after {}ms: {}", elapsed_ms, e
        ),
    }

    Json(result.into())
}

/// Hand the request to the blocking pool; decode and inference are CPU-bound
async fn run_detection(state: &AppState, body: Bytes) -> Result<Vec<Detection>, DetectError> {
    if body.is_empty() {
        return Err(DetectError::EmptyInput);
    }

    let detector = state.detector.clone();
    let allow_list = state.allow_list.clone();

    tokio::task::spawn_blocking(move || detect_objects(detector.as_ref(), &allow_list, &body))
        .await?
}

/// Decode `data`, run the detector, and keep allow-listed objects
///
/// Candidates keep the order the detector produced them in.
pub fn detect_objects(
    detector: &dyn ObjectDetector,
    allow_list: &AllowList,
    data: &[u8],
) -> Result<Vec<Detection>, DetectError> {
    let (frame, image_info) = decode_frame(data).map_err(|e| {
        debug!("Failed to decode image: {}", e);
        DetectError::from(e)
    })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        image_info.width, image_info.height, image_info.size_bytes
    );

    let candidates = detector.detect(&frame, CONFIDENCE_THRESHOLD)?;
    let total = candidates.len();

    let results = filter_detections(detector, allow_list, candidates)?;

    debug!("{} of {} candidates passed the allow-list", results.len(), total);

    Ok(results)
}

/// Resolve labels, drop anything off the allow-list, and truncate boxes
/// to integer pixels
pub fn filter_detections(
    detector: &dyn ObjectDetector,
    allow_list: &AllowList,
    candidates: Vec<RawDetection>,
) -> Result<Vec<Detection>, DetectError> {
    let mut results = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let label = detector.label(candidate.class_id).ok_or_else(|| {
            DetectError::Internal(format!("unknown class id {}", candidate.class_id))
        })?;

        if !allow_list.contains(label) {
            continue;
        }

        let [x1, y1, x2, y2] = candidate.bbox;
        results.push(Detection {
            x1: x1 as i32,
            y1: y1 as i32,
            x2: x2 as i32,
            y2: y2 as i32,
            label: label.to_string(),
            conf: candidate.confidence,
        });
    }

    Ok(results)
}
