// SPDX-License-Identifier: GPL-3.0-only

//! In-memory thumbnail cache
//!
//! Thumbnails are keyed by the path of the full-size image on disk. A missing
//! entry is simply regenerated from that file, so eviction is always safe.

use crate::errors::StoreResult;
use crate::pipelines::compose::processing;
use image::RgbaImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Collection of image thumbnails, generated on demand
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    size: u32,
    entries: HashMap<PathBuf, Arc<RgbaImage>>,
}

impl ThumbnailCache {
    /// Thumbnails fit a square box of `size` pixels
    pub fn new(size: u32) -> Self {
        Self {
            size,
            entries: HashMap::new(),
        }
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.size
    }

    /// Thumbnail for the image at `key`, creating and caching it if needed
    pub fn thumbnail_for_key(&mut self, key: &Path) -> StoreResult<Arc<RgbaImage>> {
        if let Some(thumbnail) = self.entries.get(key) {
            return Ok(Arc::clone(thumbnail));
        }

        debug!(key = %key.display(), "Thumbnail cache miss");
        let image = processing::load_image(key)?.to_rgba8();
        Ok(self.add_thumbnail_for_image(&image, key))
    }

    /// Scale `image` into a thumbnail and store it under `key`
    ///
    /// Replaces any existing entry for the key.
    pub fn add_thumbnail_for_image(&mut self, image: &RgbaImage, key: &Path) -> Arc<RgbaImage> {
        let thumbnail = Arc::new(processing::thumbnail(image, self.size));
        self.entries.insert(key.to_path_buf(), Arc::clone(&thumbnail));
        thumbnail
    }

    pub fn contains(&self, key: &Path) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &Path) -> Option<Arc<RgbaImage>> {
        self.entries.remove(key)
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use image::Rgba;

    #[test]
    fn test_add_and_lookup() {
        let mut cache = ThumbnailCache::new(50);
        let image = RgbaImage::from_pixel(200, 100, Rgba([5, 5, 5, 255]));
        let key = Path::new("/photos/a.jpg");

        let thumb = cache.add_thumbnail_for_image(&image, key);
        assert_eq!(thumb.dimensions(), (50, 25));
        assert!(cache.contains(key));

        // Served from the cache without touching the (nonexistent) file
        let again = cache.thumbnail_for_key(key).unwrap();
        assert!(Arc::ptr_eq(&thumb, &again));
    }

    #[test]
    fn test_generated_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        RgbaImage::from_pixel(30, 60, Rgba([1, 2, 3, 255]))
            .save(&path)
            .unwrap();

        let mut cache = ThumbnailCache::new(20);
        assert!(cache.is_empty());
        let thumb = cache.thumbnail_for_key(&path).unwrap();
        assert_eq!(thumb.dimensions(), (10, 20));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        // Regenerated after eviction
        assert!(cache.thumbnail_for_key(&path).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let mut cache = ThumbnailCache::new(20);
        let err = cache
            .thumbnail_for_key(Path::new("/nonexistent/photo.png"))
            .unwrap_err();
        assert!(err.is(ErrorCode::FileNotFound));
        assert!(cache.is_empty());
    }
}
