// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Frame decoding for the detection endpoint

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// A decoded RGB frame (height x width x 3), owned by a single request
pub type Frame = RgbImage;

/// Errors raised while turning raw request bytes into a frame
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    EmptyData,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),
}

/// Image information extracted during decoding
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size of the encoded payload in bytes
    pub size_bytes: usize,
}

/// Decode raw image bytes into an RGB frame
///
/// The format is sniffed from the payload itself; the request's
/// content type is never consulted. An EXIF orientation tag is applied,
/// so the frame (and `ImageInfo` dimensions) are upright. Any alpha
/// channel is dropped and grayscale input is expanded to three channels.
///
/// # Returns
/// * `Ok((Frame, ImageInfo))` - The decoded frame and metadata
/// * `Err(ImageError)` - If the payload is empty or cannot be decoded
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let mut decoder = ImageReader::with_format(Cursor::new(bytes), format)
        .into_decoder()
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);

    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    img.apply_orientation(orientation);

    if img.width() == 0 || img.height() == 0 {
        return Err(ImageError::DecodeFailed("image has no pixel data".to_string()));
    }

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img.to_rgb8(), info))
}

/// Detect image format from magic bytes
///
/// Any container the `image` crate recognizes is accepted.
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    image::guess_format(bytes).map_err(|_| ImageError::UnsupportedFormat)
}
