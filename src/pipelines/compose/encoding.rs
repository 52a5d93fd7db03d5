// SPDX-License-Identifier: GPL-3.0-only

//! Stereogram encoding
//!
//! This module turns composed images into bytes for saving or sharing:
//! - JPEG (with quality control)
//! - PNG (lossless, keeps transparency)
//! - GIF (single frame, or a looping animation of the left and right views)

use crate::constants::animation;
use crate::errors::{ErrorCode, StoreError, StoreResult};
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
    /// GIF format (palette, optionally animated)
    Gif,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "jpg",
            EncodingFormat::Png => "png",
            EncodingFormat::Gif => "gif",
        }
    }

    /// MIME type used when handing the data to other applications
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => "image/jpeg",
            EncodingFormat::Png => "image/png",
            EncodingFormat::Gif => "image/gif",
        }
    }

    fn to_image_format(self) -> ImageFormat {
        match self {
            EncodingFormat::Jpeg => ImageFormat::Jpeg,
            EncodingFormat::Png => ImageFormat::Png,
            EncodingFormat::Gif => ImageFormat::Gif,
        }
    }
}

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
            EncodingQuality::Maximum => 98,
        }
    }
}

/// Encoded image data ready for saving or sharing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportData {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportData {
    fn new(format: EncodingFormat, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: format.mime_type(),
            extension: format.extension(),
            bytes,
        }
    }
}

/// Encode a still image
pub fn encode(
    image: &RgbaImage,
    format: EncodingFormat,
    quality: EncodingQuality,
) -> StoreResult<ExportData> {
    let bytes = match format {
        EncodingFormat::Jpeg => encode_jpeg(image, quality)?,
        EncodingFormat::Png | EncodingFormat::Gif => {
            let mut buffer = Vec::new();
            image
                .write_to(&mut std::io::Cursor::new(&mut buffer), format.to_image_format())
                .map_err(|e| encoding_failed(format, e))?;
            buffer
        }
    };

    debug!(format = ?format, size = bytes.len(), "Encoding complete");
    Ok(ExportData::new(format, bytes))
}

/// Encode frames as a looping animated GIF
pub fn encode_animated_gif(frames: &[RgbaImage], delay: Duration) -> StoreResult<ExportData> {
    if frames.is_empty() {
        return Err(StoreError::new(
            ErrorCode::UnknownError,
            "Cannot encode an animation without frames",
        ));
    }

    let delay = image::Delay::from_saturating_duration(delay.max(animation::MIN_FRAME_DELAY));
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| encoding_failed(EncodingFormat::Gif, e))?;
        encoder
            .encode_frames(
                frames
                    .iter()
                    .map(|frame| Frame::from_parts(frame.clone(), 0, 0, delay)),
            )
            .map_err(|e| encoding_failed(EncodingFormat::Gif, e))?;
    }

    debug!(frames = frames.len(), size = buffer.len(), "Animated GIF encoded");
    Ok(ExportData::new(EncodingFormat::Gif, buffer))
}

/// Encode image as JPEG
///
/// JPEG has no alpha channel, so transparent padding is flattened to black.
fn encode_jpeg(image: &RgbaImage, quality: EncodingQuality) -> StoreResult<Vec<u8>> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut buffer = Vec::new();

    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.jpeg_quality());
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| encoding_failed(EncodingFormat::Jpeg, e))?;

    Ok(buffer)
}

fn encoding_failed(format: EncodingFormat, err: image::ImageError) -> StoreError {
    StoreError::new(
        ErrorCode::UnknownError,
        format!("{:?} encoding failed: {}", format, err),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        RgbaImage::from_pixel(8, 4, Rgba([120, 60, 30, 255]))
    }

    #[test]
    fn test_format_extensions() {
        assert_eq!(EncodingFormat::Jpeg.extension(), "jpg");
        assert_eq!(EncodingFormat::Png.extension(), "png");
        assert_eq!(EncodingFormat::Gif.extension(), "gif");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(EncodingFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(EncodingFormat::Gif.mime_type(), "image/gif");
    }

    #[test]
    fn test_jpeg_quality_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
        assert_eq!(EncodingQuality::Maximum.jpeg_quality(), 98);
    }

    #[test]
    fn test_jpeg_output_decodes() {
        let data = encode(&sample(), EncodingFormat::Jpeg, EncodingQuality::High).unwrap();
        assert_eq!(data.mime_type, "image/jpeg");
        assert_eq!(&data.bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&data.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn test_animated_gif_header() {
        let frames = vec![sample(), sample()];
        let data = encode_animated_gif(&frames, Duration::from_millis(100)).unwrap();
        assert_eq!(data.extension, "gif");
        assert!(data.bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_animated_gif_needs_frames() {
        assert!(encode_animated_gif(&[], Duration::from_millis(100)).is_err());
    }
}
