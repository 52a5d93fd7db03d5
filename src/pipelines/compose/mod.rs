// SPDX-License-Identifier: MPL-2.0

//! Async stereogram compose pipeline
//!
//! ```text
//! Left + Right images → Compose → Encoding → Disk I/O
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Compose**: Merge the pair according to the viewing method (blocking pool)
//! 2. **Encoding**: Convert to JPEG/PNG/GIF (blocking pool)
//! 3. **Disk I/O**: Save to a timestamped file (async)
//!
//! The caller's task stays free while the CPU-bound stages run, which is what
//! lets a front end keep a busy indicator animating during generation.

pub mod encoding;
pub mod processing;

pub use encoding::{EncodingFormat, EncodingQuality, ExportData};
pub use processing::WhichHalf;

use crate::constants::animation;
use crate::errors::StoreResult;
use crate::stereogram::ViewingMethod;
use image::RgbaImage;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Compose on the blocking pool
pub async fn compose_async(
    left: Arc<RgbaImage>,
    right: Arc<RgbaImage>,
    method: ViewingMethod,
) -> StoreResult<RgbaImage> {
    tokio::task::spawn_blocking(move || processing::compose(&left, &right, method)).await?
}

/// Settings for [`ComposePipeline`]
#[derive(Debug, Clone)]
pub struct ComposeConfig {
    /// Format for still viewing methods
    pub format: EncodingFormat,
    /// JPEG quality
    pub quality: EncodingQuality,
    /// Frame delay for the animated GIF view
    pub frame_delay: Duration,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            format: EncodingFormat::Jpeg,
            quality: EncodingQuality::High,
            frame_delay: animation::DEFAULT_FRAME_DELAY,
        }
    }
}

/// Complete compose pipeline
///
/// Orchestrates the compose → encode → save workflow.
pub struct ComposePipeline {
    config: ComposeConfig,
}

impl ComposePipeline {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    /// Compose and encode a pair without touching the disk
    ///
    /// The animated GIF method yields a two-frame animation; every other
    /// method yields a single still in the configured format.
    pub async fn compose_and_encode(
        &self,
        left: Arc<RgbaImage>,
        right: Arc<RgbaImage>,
        method: ViewingMethod,
    ) -> StoreResult<ExportData> {
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || encode_pair(&left, &right, method, &config)).await?
    }

    /// Compose, encode and save a pair asynchronously
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path to the saved file
    pub async fn compose_and_save(
        &self,
        left: Arc<RgbaImage>,
        right: Arc<RgbaImage>,
        method: ViewingMethod,
        output_dir: PathBuf,
    ) -> StoreResult<PathBuf> {
        self.compose_and_save_with_progress(left, right, method, output_dir, |_| {})
            .await
    }

    /// Compose and save with progress callback
    ///
    /// The callback receives 0.0 before composing, 0.5 once encoded and 1.0 when saved.
    pub async fn compose_and_save_with_progress<F>(
        &self,
        left: Arc<RgbaImage>,
        right: Arc<RgbaImage>,
        method: ViewingMethod,
        output_dir: PathBuf,
        mut progress: F,
    ) -> StoreResult<PathBuf>
    where
        F: FnMut(f32) + Send,
    {
        progress(0.0);

        let encoded = self.compose_and_encode(left, right, method).await?;
        progress(0.5);

        let path = save(encoded, output_dir).await?;
        progress(1.0);

        Ok(path)
    }
}

impl Default for ComposePipeline {
    fn default() -> Self {
        Self::new(ComposeConfig::default())
    }
}

/// Compose and encode synchronously
pub fn encode_pair(
    left: &RgbaImage,
    right: &RgbaImage,
    method: ViewingMethod,
    config: &ComposeConfig,
) -> StoreResult<ExportData> {
    match method {
        ViewingMethod::AnimatedGif => {
            let frames = processing::animation_frames(left, right);
            encoding::encode_animated_gif(&frames, config.frame_delay)
        }
        _ => {
            let composed = processing::compose(left, right, method)?;
            encoding::encode(&composed, config.format, config.quality)
        }
    }
}

/// Write encoded data to a timestamped file in `output_dir`
///
/// Creates `output_dir` if it does not exist yet. Runs the write on the
/// blocking pool.
pub async fn save(encoded: ExportData, output_dir: PathBuf) -> StoreResult<PathBuf> {
    tokio::task::spawn_blocking(move || save_blocking(&encoded, &output_dir)).await?
}

/// Blocking version of [`save`]
pub fn save_blocking(encoded: &ExportData, output_dir: &Path) -> StoreResult<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let stem = format!("STEREO_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let (mut file, filepath) = create_unique(output_dir, &stem, encoded.extension)?;

    info!(path = %filepath.display(), "Saving stereogram");
    file.write_all(&encoded.bytes)?;
    info!(path = %filepath.display(), size = encoded.bytes.len(), "Stereogram saved successfully");

    Ok(filepath)
}

/// Create `<stem>.<ext>` in `dir`, or `<stem>_<n>.<ext>` if that is taken
///
/// The file is created exclusively, so concurrent exports never share a name.
fn create_unique(dir: &Path, stem: &str, extension: &str) -> StoreResult<(File, PathBuf)> {
    let mut suffix = 0;
    loop {
        let name = match suffix {
            0 => format!("{}.{}", stem, extension),
            n => format!("{}_{}.{}", stem, n, extension),
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
