// SPDX-License-Identifier: GPL-3.0-only

//! A single stereogram record
//!
//! A stereogram is a pair of images plus a property file, stored together in
//! one directory:
//!
//! ```text
//! <store>/<uuid>/
//!     left.jpg
//!     right.jpg
//!     properties.json
//!     thumbnail.png      (written on first thumbnail request)
//! ```
//!
//! The composed image and the thumbnail are derived data. They are generated
//! on first use and kept in memory until [`Stereogram::release_cached_images`]
//! is called or a property change makes them stale.

pub mod properties;

pub use properties::{Orientation, Properties, ViewingMethod};

use crate::constants::{THUMBNAIL_SIZE, layout};
use crate::errors::{ErrorCode, StoreError, StoreResult};
use crate::pipelines::compose::{
    self, ComposeConfig, EncodingFormat, EncodingQuality, ExportData, encoding, processing,
};
use crate::storage;
use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One image pair with its properties and cached derived images
pub struct Stereogram {
    base_dir: PathBuf,
    properties: Properties,
    stereogram_image: Option<Arc<RgbaImage>>,
    thumbnail_image: Option<Arc<RgbaImage>>,
    thumbnail_size: u32,
}

impl Stereogram {

    /// Wrap an existing record directory and its properties
    ///
    /// Does not touch the disk; use [`Stereogram::open`] to load a record.
    pub fn new(base_dir: PathBuf, properties: Properties) -> Self {
        Self {
            base_dir,
            properties,
            stereogram_image: None,
            thumbnail_image: None,
            thumbnail_size: THUMBNAIL_SIZE,
        }
    }

    /// Create a new stereogram from two images and save it under `parent_dir`
    pub fn create_and_save(
        left: &DynamicImage,
        right: &DynamicImage,
        parent_dir: &Path,
    ) -> StoreResult<Self> {
        Self::create_and_save_taken_at(left, right, parent_dir, Utc::now())
    }

    /// Same as [`Stereogram::create_and_save`] with an explicit capture date
    pub fn create_and_save_taken_at(
        left: &DynamicImage,
        right: &DynamicImage,
        parent_dir: &Path,
        date_taken: DateTime<Utc>,
    ) -> StoreResult<Self> {
        let base_dir = storage::new_record_dir(parent_dir)?;

        let properties = Properties::new(
            date_taken,
            Orientation::from_dimensions(left.width(), left.height()),
        );
        let stereogram = Self::new(base_dir, properties);

        if let Err(e) = stereogram.write_initial_files(left, right) {
            // Don't leave a half-written record behind for the next scan
            if let Err(cleanup) = storage::remove_record_dir(&stereogram.base_dir) {
                warn!(error = %cleanup, "Failed to clean up partial record");
            }
            return Err(e);
        }

        info!(path = %stereogram.base_dir.display(), "Created stereogram");
        Ok(stereogram)
    }

    fn write_initial_files(&self, left: &DynamicImage, right: &DynamicImage) -> StoreResult<()> {
        for (image, path) in [(left, self.left_path()), (right, self.right_path())] {
            let data = encoding::encode(
                &image.to_rgba8(),
                EncodingFormat::Jpeg,
                EncodingQuality::Maximum,
            )?;
            std::fs::write(&path, &data.bytes)?;
        }
        self.save_properties()
    }

    /// Load the stereogram stored in `dir`
    pub fn open(dir: &Path) -> StoreResult<Self> {
        let properties = Properties::load(&dir.join(layout::PROPERTIES))?;
        let stereogram = Self::new(dir.to_path_buf(), properties);

        for path in [stereogram.left_path(), stereogram.right_path()] {
            if !path.is_file() {
                return Err(StoreError::new(
                    ErrorCode::FileNotFound,
                    format!("Missing image {}", path.display()),
                ));
            }
        }

        debug!(path = %dir.display(), view_mode = ?stereogram.viewing_method(), "Opened stereogram");
        Ok(stereogram)
    }

    /// Load every stereogram found in the subdirectories of `dir`
    ///
    /// Subdirectories that don't hold a valid record are skipped with a warning.
    /// The result is ordered by date taken, oldest first.
    pub fn all_under(dir: &Path) -> StoreResult<Vec<Self>> {
        let mut stereograms: Vec<Self> = storage::record_dirs(dir)?
            .into_iter()
            .filter_map(|record| match Self::open(&record) {
                Ok(stereogram) => Some(stereogram),
                Err(e) => {
                    warn!(path = %record.display(), error = %e, "Skipping invalid record");
                    None
                }
            })
            .collect();

        stereograms.sort_by(|a, b| {
            a.properties
                .date_taken
                .cmp(&b.properties.date_taken)
                .then_with(|| a.base_dir.cmp(&b.base_dir))
        });

        info!(path = %dir.display(), count = stereograms.len(), "Loaded stereograms");
        Ok(stereograms)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn left_path(&self) -> PathBuf {
        self.base_dir.join(layout::LEFT_IMAGE)
    }

    pub fn right_path(&self) -> PathBuf {
        self.base_dir.join(layout::RIGHT_IMAGE)
    }

    pub fn properties_path(&self) -> PathBuf {
        self.base_dir.join(layout::PROPERTIES)
    }

    fn thumbnail_path(&self) -> PathBuf {
        self.base_dir.join(layout::THUMBNAIL)
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn viewing_method(&self) -> ViewingMethod {
        self.properties.view_mode
    }

    pub fn date_taken(&self) -> DateTime<Utc> {
        self.properties.date_taken
    }

    pub fn orientation(&self) -> Orientation {
        self.properties.orientation
    }

    /// Edge length of the square box thumbnails fit into
    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnail_size
    }

    /// Change the thumbnail box size; a thumbnail of another size is regenerated
    pub fn set_thumbnail_size(&mut self, size: u32) {
        if self.thumbnail_size != size {
            self.thumbnail_size = size;
            self.thumbnail_image = None;
        }
    }

    /// Change how the stereogram is displayed and save the property file
    ///
    /// Cached images are dropped when the method actually changes. Nothing
    /// changes, in memory or on disk, if the property file can't be written.
    pub fn set_viewing_method(&mut self, method: ViewingMethod) -> StoreResult<()> {
        if self.properties.view_mode == method {
            return Ok(());
        }

        let mut properties = self.properties.clone();
        properties.view_mode = method;
        let stale_thumbnail = properties.thumbnail.take().is_some();
        properties.save(&self.properties_path())?;

        self.properties = properties;
        self.release_cached_images();
        if stale_thumbnail {
            self.remove_thumbnail_file();
        }
        Ok(())
    }

    /// Write the property file
    pub fn save_properties(&self) -> StoreResult<()> {
        self.properties.save(&self.properties_path())
    }

    pub fn left_image(&self) -> StoreResult<RgbaImage> {
        Ok(processing::load_image(&self.left_path())?.to_rgba8())
    }

    pub fn right_image(&self) -> StoreResult<RgbaImage> {
        Ok(processing::load_image(&self.right_path())?.to_rgba8())
    }

    /// The left and right images combined according to the viewing method
    ///
    /// Generated on first request and cached afterwards.
    pub fn stereogram_image(&mut self) -> StoreResult<Arc<RgbaImage>> {
        if let Some(image) = &self.stereogram_image {
            return Ok(Arc::clone(image));
        }

        let image = Arc::new(processing::compose(
            &self.left_image()?,
            &self.right_image()?,
            self.viewing_method(),
        )?);
        self.stereogram_image = Some(Arc::clone(&image));
        Ok(image)
    }

    /// Thumbnail of the stereogram image
    ///
    /// Read back from the record's thumbnail file when there is one, otherwise
    /// generated from the stereogram image and written to disk.
    pub fn thumbnail_image(&mut self) -> StoreResult<Arc<RgbaImage>> {
        if let Some(image) = &self.thumbnail_image {
            return Ok(Arc::clone(image));
        }

        if self.properties.thumbnail.is_some() {
            match processing::load_image(&self.thumbnail_path()) {
                // Thumbnails fill the box along their longer side
                Ok(image) if image.width().max(image.height()) == self.thumbnail_size() => {
                    let image = Arc::new(image.to_rgba8());
                    self.thumbnail_image = Some(Arc::clone(&image));
                    return Ok(image);
                }
                Ok(image) => {
                    debug!(
                        width = image.width(),
                        height = image.height(),
                        size = self.thumbnail_size,
                        "Stored thumbnail has another size, regenerating"
                    );
                }
                Err(e) => {
                    debug!(error = %e, "Stored thumbnail unusable, regenerating");
                }
            }
        }

        let source = self.stereogram_image()?;
        let image = Arc::new(processing::thumbnail(&source, self.thumbnail_size()));
        image.save(self.thumbnail_path())?;

        self.properties.thumbnail = Some(layout::THUMBNAIL.to_string());
        self.save_properties()?;

        self.thumbnail_image = Some(Arc::clone(&image));
        Ok(image)
    }

    /// Regenerate the stereogram image and thumbnail, replacing the caches
    ///
    /// Usually run off the caller's thread just after a property change; see
    /// [`Stereogram::refresh_async`].
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.invalidate_derived_images();
        self.stereogram_image()?;
        self.thumbnail_image()?;
        debug!(path = %self.base_dir.display(), "Refreshed stereogram");
        Ok(())
    }

    /// [`Stereogram::refresh`] on the blocking pool
    pub async fn refresh_async(mut self) -> StoreResult<Self> {
        tokio::task::spawn_blocking(move || {
            self.refresh()?;
            Ok::<_, StoreError>(self)
        })
        .await?
    }

    /// Drop the cached images; they are regenerated on the next request
    pub fn release_cached_images(&mut self) {
        self.stereogram_image = None;
        self.thumbnail_image = None;
    }

    pub fn has_cached_images(&self) -> bool {
        self.stereogram_image.is_some() || self.thumbnail_image.is_some()
    }

    fn invalidate_derived_images(&mut self) {
        self.release_cached_images();
        if self.properties.thumbnail.take().is_some() {
            self.remove_thumbnail_file();
        }
    }

    fn remove_thumbnail_file(&self) {
        let path = self.thumbnail_path();
        if let Err(e) = std::fs::remove_file(&path) {
            debug!(path = %path.display(), error = %e, "Stale thumbnail not removed");
        }
    }

    /// MIME-typed data for sharing
    ///
    /// Animated GIF stereograms export as a GIF animation, everything else as a still.
    pub fn export_data(&mut self, config: &ComposeConfig) -> StoreResult<ExportData> {
        match self.viewing_method() {
            ViewingMethod::AnimatedGif => compose::encode_pair(
                &self.left_image()?,
                &self.right_image()?,
                ViewingMethod::AnimatedGif,
                config,
            ),
            _ => {
                let image = self.stereogram_image()?;
                encoding::encode(&image, config.format, config.quality)
            }
        }
    }

    /// Delete the directory holding this stereogram
    pub fn delete_from_disk(self) -> StoreResult<()> {
        storage::remove_record_dir(&self.base_dir)
    }
}

impl PartialEq for Stereogram {
    fn eq(&self, other: &Self) -> bool {
        self.base_dir == other.base_dir
    }
}

impl Eq for Stereogram {}

impl fmt::Debug for Stereogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stereogram")
            .field("base_dir", &self.base_dir)
            .field("view_mode", &self.properties.view_mode)
            .field("date_taken", &self.properties.date_taken)
            .field("cached", &self.has_cached_images())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pair() -> (DynamicImage, DynamicImage) {
        (
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([200, 30, 30, 255]))),
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([30, 30, 200, 255]))),
        )
    }

    #[test]
    fn test_create_writes_layout() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();

        assert!(stereogram.left_path().is_file());
        assert!(stereogram.right_path().is_file());
        assert!(stereogram.properties_path().is_file());
        assert_eq!(stereogram.viewing_method(), ViewingMethod::CrossEye);
        assert_eq!(stereogram.orientation(), Orientation::Landscape);
    }

    #[test]
    fn test_open_missing_image() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();
        std::fs::remove_file(stereogram.right_path()).unwrap();

        let err = Stereogram::open(stereogram.base_dir()).unwrap_err();
        assert!(err.is(ErrorCode::FileNotFound));
    }

    #[test]
    fn test_stereogram_image_is_cached() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let mut stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();

        let first = stereogram.stereogram_image().unwrap();
        assert_eq!(first.dimensions(), (80, 30));
        let second = stereogram.stereogram_image().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        stereogram.release_cached_images();
        assert!(!stereogram.has_cached_images());
    }

    #[test]
    fn test_changing_method_drops_thumbnail() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let mut stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();

        let thumb = stereogram.thumbnail_image().unwrap();
        assert!(thumb.width() <= THUMBNAIL_SIZE && thumb.height() <= THUMBNAIL_SIZE);
        assert!(stereogram.base_dir().join(layout::THUMBNAIL).is_file());

        stereogram.set_viewing_method(ViewingMethod::RedGreen).unwrap();
        assert!(!stereogram.has_cached_images());
        assert!(stereogram.properties().thumbnail.is_none());
        assert!(!stereogram.base_dir().join(layout::THUMBNAIL).exists());

        let reopened = Stereogram::open(stereogram.base_dir()).unwrap();
        assert_eq!(reopened.viewing_method(), ViewingMethod::RedGreen);
    }

    #[test]
    fn test_failed_method_save_changes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let mut stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();
        stereogram.thumbnail_image().unwrap();

        // A directory in place of the property file makes the write fail
        std::fs::remove_file(stereogram.properties_path()).unwrap();
        std::fs::create_dir(stereogram.properties_path()).unwrap();

        assert!(stereogram.set_viewing_method(ViewingMethod::WallEye).is_err());
        assert_eq!(stereogram.viewing_method(), ViewingMethod::CrossEye);
        assert!(stereogram.properties().thumbnail.is_some());
        assert!(stereogram.has_cached_images());
        assert!(stereogram.base_dir().join(layout::THUMBNAIL).is_file());
    }

    #[test]
    fn test_thumbnail_follows_size() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let mut stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();
        assert_eq!(stereogram.thumbnail_size(), THUMBNAIL_SIZE);

        stereogram.set_thumbnail_size(24);
        assert_eq!(stereogram.thumbnail_image().unwrap().dimensions(), (24, 9));

        stereogram.set_thumbnail_size(16);
        assert_eq!(stereogram.thumbnail_image().unwrap().dimensions(), (16, 6));

        // The file on disk was rewritten at the new size
        let mut reopened = Stereogram::open(stereogram.base_dir()).unwrap();
        reopened.set_thumbnail_size(16);
        assert_eq!(reopened.thumbnail_image().unwrap().dimensions(), (16, 6));
    }

    #[test]
    fn test_random_dot_export_not_implemented() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let mut stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();
        stereogram.set_viewing_method(ViewingMethod::RandomDot).unwrap();

        let err = stereogram.export_data(&ComposeConfig::default()).unwrap_err();
        assert!(err.is(ErrorCode::NotImplemented));
    }

    #[tokio::test]
    async fn test_refresh_async_fills_caches() {
        let root = tempfile::tempdir().unwrap();
        let (left, right) = pair();
        let stereogram = Stereogram::create_and_save(&left, &right, root.path()).unwrap();

        let stereogram = stereogram.refresh_async().await.unwrap();
        assert!(stereogram.has_cached_images());
        assert!(stereogram.properties().thumbnail.is_some());
    }
}
