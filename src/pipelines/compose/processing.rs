// SPDX-License-Identifier: MPL-2.0

//! Image compositing for stereograms
//!
//! This module holds the pure bitmap operations behind every viewing method:
//! - Splitting an image into left and right halves
//! - Side-by-side composition (cross-eye and wall-eye)
//! - Swapping the halves of an existing side-by-side image
//! - Red/green anaglyph merge
//! - Frames for the animated view
//! - Thumbnail scaling
//!
//! Everything here is synchronous and CPU-bound. Callers on an async runtime
//! should go through [`super::compose_async`].

use crate::errors::{ErrorCode, StoreError, StoreResult};
use crate::stereogram::ViewingMethod;
use image::{DynamicImage, RgbaImage, imageops};
use std::path::Path;
use tracing::debug;

/// Which half of an image to take in [`half_of_image`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhichHalf {
    /// Columns `[0, width / 2)`
    Left,
    /// Columns `[width / 2, width)`; gets the extra column for odd widths
    Right,
}

/// Load an image from disk
pub fn load_image(path: &Path) -> StoreResult<DynamicImage> {
    if !path.is_file() {
        return Err(StoreError::new(
            ErrorCode::FileNotFound,
            format!("Image file not found: {}", path.display()),
        ));
    }

    let image = image::open(path).map_err(|e| {
        StoreError::new(
            ErrorCode::InvalidFileFormat,
            format!("Could not decode {}: {}", path.display(), e),
        )
    })?;

    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Loaded image"
    );
    Ok(image)
}

/// Copy the left or right half of an image
pub fn half_of_image(image: &RgbaImage, which: WhichHalf) -> RgbaImage {
    let (width, height) = image.dimensions();
    let left_width = width / 2;

    match which {
        WhichHalf::Left => imageops::crop_imm(image, 0, 0, left_width, height).to_image(),
        WhichHalf::Right => {
            imageops::crop_imm(image, left_width, 0, width - left_width, height).to_image()
        }
    }
}

/// Split a side-by-side image into its (left, right) halves
pub fn split_pair(image: &RgbaImage) -> (RgbaImage, RgbaImage) {
    (
        half_of_image(image, WhichHalf::Left),
        half_of_image(image, WhichHalf::Right),
    )
}

/// Place two images side by side
///
/// The result is as wide as both inputs together and as tall as the taller one.
/// Both images are top-aligned; any area not covered is transparent black.
pub fn make_stereogram(left: &RgbaImage, right: &RgbaImage) -> RgbaImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());

    let mut output = RgbaImage::new(width, height);
    imageops::replace(&mut output, left, 0, 0);
    imageops::replace(&mut output, right, i64::from(left.width()), 0);
    output
}

/// Swap the left and right halves of a side-by-side image
///
/// Turns a cross-eye stereogram into a wall-eye one and back.
pub fn change_viewing_method(image: &RgbaImage) -> RgbaImage {
    let (left, right) = split_pair(image);
    make_stereogram(&right, &left)
}

/// Superimpose two images for red/green glasses
///
/// The red channel comes from the left image, green and blue from the right.
/// Only the area both images cover is kept.
pub fn make_anaglyph(left: &RgbaImage, right: &RgbaImage) -> RgbaImage {
    let width = left.width().min(right.width());
    let height = left.height().min(right.height());

    RgbaImage::from_fn(width, height, |x, y| {
        let l = left.get_pixel(x, y);
        let r = right.get_pixel(x, y);
        image::Rgba([l[0], r[1], r[2], 255])
    })
}

/// Frames for the animated view: left then right, padded to a common size
pub fn animation_frames(left: &RgbaImage, right: &RgbaImage) -> Vec<RgbaImage> {
    let width = left.width().max(right.width());
    let height = left.height().max(right.height());

    [left, right]
        .into_iter()
        .map(|source| {
            if source.dimensions() == (width, height) {
                return source.clone();
            }
            let mut frame = RgbaImage::new(width, height);
            imageops::replace(&mut frame, source, 0, 0);
            frame
        })
        .collect()
}

/// Combine two images according to a viewing method
///
/// Animated GIF has no single still image; its still representation is the
/// cross-eye image and the animation is produced at encoding time.
pub fn compose(
    left: &RgbaImage,
    right: &RgbaImage,
    method: ViewingMethod,
) -> StoreResult<RgbaImage> {
    let output = match method {
        ViewingMethod::CrossEye | ViewingMethod::AnimatedGif => make_stereogram(left, right),
        ViewingMethod::WallEye => make_stereogram(right, left),
        ViewingMethod::RedGreen => make_anaglyph(left, right),
        ViewingMethod::RandomDot => {
            return Err(StoreError::not_implemented("Random-dot stereograms"));
        }
    };

    debug!(
        method = ?method,
        width = output.width(),
        height = output.height(),
        "Composed stereogram"
    );
    Ok(output)
}

/// Size of `(width, height)` scaled to fit a `size` x `size` box, keeping aspect ratio
pub fn fit_within(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if width >= height {
        let scaled = (u64::from(height) * u64::from(size) / u64::from(width)).max(1);
        (size, scaled as u32)
    } else {
        let scaled = (u64::from(width) * u64::from(size) / u64::from(height)).max(1);
        (scaled as u32, size)
    }
}

/// Scale an image down (or up) to fit a square box of `size` pixels
pub fn thumbnail(image: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = fit_within(image.width(), image.height(), size);
    if width == 0 || height == 0 {
        return RgbaImage::new(0, 0);
    }
    imageops::thumbnail(image, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_halves_cover_the_image() {
        let image = solid(7, 3, [1, 2, 3, 255]);
        let (left, right) = split_pair(&image);
        assert_eq!(left.dimensions(), (3, 3));
        assert_eq!(right.dimensions(), (4, 3));
        assert_eq!(left.width() + right.width(), image.width());
    }

    #[test]
    fn test_stereogram_dimensions() {
        let left = solid(10, 8, [255, 0, 0, 255]);
        let right = solid(6, 12, [0, 255, 0, 255]);
        let output = make_stereogram(&left, &right);
        assert_eq!(output.dimensions(), (16, 12));
        assert_eq!(*output.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*output.get_pixel(10, 0), Rgba([0, 255, 0, 255]));
        // Below the shorter left image
        assert_eq!(*output.get_pixel(0, 10), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_wall_eye_swaps_sides() {
        let left = solid(4, 4, [255, 0, 0, 255]);
        let right = solid(4, 4, [0, 0, 255, 255]);
        let output = compose(&left, &right, ViewingMethod::WallEye).unwrap();
        assert_eq!(*output.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*output.get_pixel(4, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_change_viewing_method_twice_is_identity() {
        let left = solid(5, 3, [10, 20, 30, 255]);
        let right = solid(5, 3, [40, 50, 60, 255]);
        let cross = make_stereogram(&left, &right);
        let wall = change_viewing_method(&cross);
        assert_ne!(cross, wall);
        assert_eq!(change_viewing_method(&wall), cross);
    }

    #[test]
    fn test_anaglyph_channels() {
        let left = solid(4, 5, [200, 10, 10, 255]);
        let right = solid(6, 3, [10, 150, 100, 255]);
        let output = make_anaglyph(&left, &right);
        assert_eq!(output.dimensions(), (4, 3));
        assert_eq!(*output.get_pixel(1, 1), Rgba([200, 150, 100, 255]));
    }

    #[test]
    fn test_random_dot_not_implemented() {
        let image = solid(2, 2, [0, 0, 0, 255]);
        let err = compose(&image, &image, ViewingMethod::RandomDot).unwrap_err();
        assert!(err.is(ErrorCode::NotImplemented));
    }

    #[test]
    fn test_animation_frames_share_size() {
        let frames = animation_frames(&solid(4, 6, [1, 1, 1, 255]), &solid(8, 2, [2, 2, 2, 255]));
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.dimensions() == (8, 6)));
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        assert_eq!(fit_within(200, 100, 100), (100, 50));
        assert_eq!(fit_within(100, 400, 100), (25, 100));
        assert_eq!(fit_within(1000, 1, 100), (100, 1));
        assert_eq!(fit_within(0, 10, 100), (0, 0));
    }

    #[test]
    fn test_thumbnail_fits_box() {
        let thumb = thumbnail(&solid(300, 150, [9, 9, 9, 255]), 100);
        assert_eq!(thumb.dimensions(), (100, 50));
    }

    #[test]
    fn test_load_missing_image() {
        let err = load_image(Path::new("/nonexistent/left.jpg")).unwrap_err();
        assert!(err.is(ErrorCode::FileNotFound));
    }
}
