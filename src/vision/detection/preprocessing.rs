// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLOv8 detection

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use ndarray::Array4;

use crate::vision::Frame;

/// Default square input size for YOLOv8 models
pub const DETECTION_INPUT_SIZE: u32 = 640;

/// Gray used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// Geometry of a letterbox transform, used to map boxes back to the frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Resize factor applied to the original frame
    pub scale: f32,
    /// Horizontal padding on the left edge
    pub pad_x: f32,
    /// Vertical padding on the top edge
    pub pad_y: f32,
    /// Original frame width
    pub orig_width: u32,
    /// Original frame height
    pub orig_height: u32,
}

impl Letterbox {
    /// Map a box from model input space back onto the original frame,
    /// clipped to the frame bounds
    pub fn restore(&self, bbox: [f32; 4]) -> [f32; 4] {
        let max_x = self.orig_width as f32;
        let max_y = self.orig_height as f32;

        [
            ((bbox[0] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((bbox[1] - self.pad_y) / self.scale).clamp(0.0, max_y),
            ((bbox[2] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((bbox[3] - self.pad_y) / self.scale).clamp(0.0, max_y),
        ]
    }
}

/// Resize a frame into a `target_size` square, preserving aspect ratio
///
/// The resized frame is centred on a gray canvas. Returns the canvas
/// and the transform needed to undo it.
pub fn letterbox(frame: &Frame, target_size: u32) -> (RgbImage, Letterbox) {
    let (orig_w, orig_h) = frame.dimensions();
    let mut canvas = RgbImage::from_pixel(target_size, target_size, Rgb([PAD_VALUE; 3]));

    if orig_w == 0 || orig_h == 0 {
        let geometry = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            orig_width: orig_w,
            orig_height: orig_h,
        };
        return (canvas, geometry);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);

    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let offset_x = (target_size - new_w) / 2;
    let offset_y = (target_size - new_h) / 2;

    if (new_w, new_h) == (orig_w, orig_h) {
        imageops::overlay(&mut canvas, frame, offset_x as i64, offset_y as i64);
    } else {
        let resized = imageops::resize(frame, new_w, new_h, FilterType::Triangle);
        imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);
    }

    let geometry = Letterbox {
        scale,
        pad_x: offset_x as f32,
        pad_y: offset_y as f32,
        orig_width: orig_w,
        orig_height: orig_h,
    };

    (canvas, geometry)
}

/// Convert an RGB image into a normalized NCHW tensor [1, 3, H, W]
///
/// Pixels are scaled to 0.0-1.0; YOLOv8 exports apply no mean/std.
pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let mut tensor = Array4::zeros((1, 3, height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
        }
    }

    tensor
}

/// Letterbox a frame and build the model input tensor in one step
pub fn preprocess_for_detection(frame: &Frame, target_size: u32) -> (Array4<f32>, Letterbox) {
    let (canvas, geometry) = letterbox(frame, target_size);
    (to_input_tensor(&canvas), geometry)
}
