// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end detection pipeline tests without ONNX Runtime
//!
//! A synthetic detector emits a hand-built YOLOv8 output tensor in model
//! input space. The real letterbox, decode, NMS and restore code turn it
//! into frame-space boxes, and the endpoint adapter filters the result.

use fabstir_detect_node::{
    api::{detect_objects, DetectError},
    vision::{
        detection::{
            postprocess::{postprocess, DEFAULT_IOU_THRESHOLD, DEFAULT_MAX_DETECTIONS},
            preprocessing::preprocess_for_detection,
            LabelMap, COCO_CLASSES, DETECTION_INPUT_SIZE,
        },
        AllowList, DetectorError, Frame, ObjectDetector, RawDetection,
    },
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use ndarray::{Array3, ArrayD};
use std::io::Cursor;

const NUM_CLASSES: usize = 80;

/// One anchor in model input space: (cx, cy, w, h), class label, score
type Anchor = ([f32; 4], &'static str, f32);

#[derive(Clone, Copy)]
enum Layout {
    ChannelsFirst,
    ChannelsLast,
}

struct SyntheticYolo {
    anchors: Vec<Anchor>,
    layout: Layout,
    labels: LabelMap,
}

impl SyntheticYolo {
    fn new(anchors: Vec<Anchor>, layout: Layout) -> Self {
        Self {
            anchors,
            layout,
            labels: LabelMap::coco(),
        }
    }

    fn output(&self) -> ArrayD<f32> {
        let n = self.anchors.len();
        let mut out = Array3::<f32>::zeros((1, 4 + NUM_CLASSES, n));

        for (i, (bbox, label, score)) in self.anchors.iter().enumerate() {
            for (c, v) in bbox.iter().enumerate() {
                out[[0, c, i]] = *v;
            }
            let class_id = COCO_CLASSES.iter().position(|l| l == label).unwrap();
            out[[0, 4 + class_id, i]] = *score;
        }

        match self.layout {
            Layout::ChannelsFirst => out.into_dyn(),
            Layout::ChannelsLast => out.permuted_axes([0, 2, 1]).to_owned().into_dyn(),
        }
    }
}

impl ObjectDetector for SyntheticYolo {
    fn detect(
        &self,
        frame: &Frame,
        confidence_threshold: f32,
    ) -> Result<Vec<RawDetection>, DetectorError> {
        let (_, letterbox) = preprocess_for_detection(frame, DETECTION_INPUT_SIZE);
        let output = self.output();

        postprocess(
            output.view(),
            self.labels.len(),
            confidence_threshold,
            DEFAULT_IOU_THRESHOLD,
            DEFAULT_MAX_DETECTIONS,
            &letterbox,
        )
    }

    fn label(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id)
    }
}

/// 1280x720 frame: scale 0.5, resized to 640x360, 140px bars top and bottom
fn hd_frame_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 720, Rgb([30, 60, 90])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn street_scene() -> Vec<Anchor> {
    vec![
        // person: model box [270, 220, 370, 420] -> frame [540, 160, 740, 560]
        ([320.0, 320.0, 100.0, 200.0], "person", 0.95),
        // overlapping duplicate of the person, suppressed by NMS
        ([325.0, 320.0, 100.0, 200.0], "person", 0.85),
        // exactly at the threshold, dropped
        ([100.0, 300.0, 40.0, 40.0], "car", 0.5),
        // confident but not on the allow-list
        ([200.0, 250.0, 20.0, 20.0], "toothbrush", 0.9),
        // dog running off the right edge: x2 clipped to 1280
        ([600.0, 200.0, 100.0, 40.0], "dog", 0.8),
    ]
}

#[test]
fn test_channels_first_scene() {
    let detector = SyntheticYolo::new(street_scene(), Layout::ChannelsFirst);
    let results = detect_objects(&detector, &AllowList::new(), &hd_frame_png()).unwrap();

    assert_eq!(results.len(), 2);

    let person = &results[0];
    assert_eq!(person.label, "person");
    assert_eq!(
        (person.x1, person.y1, person.x2, person.y2),
        (540, 160, 740, 560)
    );
    assert!((person.conf - 0.95).abs() < 1e-6);

    let dog = &results[1];
    assert_eq!(dog.label, "dog");
    assert_eq!((dog.x1, dog.y1, dog.x2, dog.y2), (1100, 80, 1280, 160));
}

#[test]
fn test_channels_last_matches_channels_first() {
    let first = SyntheticYolo::new(street_scene(), Layout::ChannelsFirst);
    let last = SyntheticYolo::new(street_scene(), Layout::ChannelsLast);
    let png = hd_frame_png();

    let a = detect_objects(&first, &AllowList::new(), &png).unwrap();
    let b = detect_objects(&last, &AllowList::new(), &png).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_results_ordered_by_confidence() {
    let anchors = vec![
        ([100.0, 200.0, 10.0, 10.0], "cat", 0.6),
        ([300.0, 200.0, 10.0, 10.0], "bicycle", 0.99),
        ([500.0, 200.0, 10.0, 10.0], "sheep", 0.75),
    ];
    let detector = SyntheticYolo::new(anchors, Layout::ChannelsFirst);

    let results = detect_objects(&detector, &AllowList::new(), &hd_frame_png()).unwrap();
    let labels: Vec<&str> = results.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["bicycle", "sheep", "cat"]);
}

#[test]
fn test_same_location_different_classes_both_kept() {
    let anchors = vec![
        ([320.0, 320.0, 80.0, 80.0], "person", 0.9),
        ([320.0, 320.0, 80.0, 80.0], "bicycle", 0.8),
    ];
    let detector = SyntheticYolo::new(anchors, Layout::ChannelsFirst);

    let results = detect_objects(&detector, &AllowList::new(), &hd_frame_png()).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_mismatched_output_is_internal_error() {
    struct WrongShape;

    impl ObjectDetector for WrongShape {
        fn detect(&self, frame: &Frame, threshold: f32) -> Result<Vec<RawDetection>, DetectorError> {
            let (_, letterbox) = preprocess_for_detection(frame, DETECTION_INPUT_SIZE);
            let output = ArrayD::<f32>::zeros(vec![1, 7, 9]);
            postprocess(output.view(), NUM_CLASSES, threshold, 0.7, 300, &letterbox)
        }

        fn label(&self, _: usize) -> Option<&str> {
            None
        }
    }

    let err = detect_objects(&WrongShape, &AllowList::new(), &hd_frame_png()).unwrap_err();
    match err {
        DetectError::Internal(msg) => assert!(msg.starts_with("inference failed"), "{msg}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
