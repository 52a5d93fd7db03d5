// SPDX-License-Identifier: GPL-3.0-only

//! The collection of all stereograms
//!
//! A [`PhotoStore`] owns every [`Stereogram`] under one root directory, in
//! date-taken order. It is not thread-safe: all mutation goes through
//! `&mut self`, and there is meant to be one store per process.

use crate::constants::THUMBNAIL_SIZE;
use crate::errors::{ErrorCode, StoreError, StoreResult};
use crate::pipelines::compose::{self, ComposeConfig};
use crate::stereogram::{Stereogram, ViewingMethod};
use crate::storage;
use crate::thumbnail_cache::ThumbnailCache;
use image::{DynamicImage, RgbaImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Collection of stereograms backed by one directory per record
#[derive(Debug)]
pub struct PhotoStore {
    root: PathBuf,
    stereograms: Vec<Stereogram>,
    thumbnails: ThumbnailCache,
    /// Viewing method each cached thumbnail was made with
    thumbnail_methods: HashMap<PathBuf, ViewingMethod>,
}

impl PhotoStore {
    /// Open the store at `root`, creating the directory if necessary
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_thumbnail_size(root, THUMBNAIL_SIZE)
    }

    /// Open the store with a non-default thumbnail size
    pub fn with_thumbnail_size(root: impl Into<PathBuf>, thumbnail_size: u32) -> StoreResult<Self> {
        let root = root.into();
        storage::ensure_store_dir(&root)?;

        let mut stereograms = Stereogram::all_under(&root)?;
        for stereogram in &mut stereograms {
            stereogram.set_thumbnail_size(thumbnail_size);
        }
        info!(path = %root.display(), count = stereograms.len(), "Photo store opened");

        Ok(Self {
            root,
            stereograms,
            thumbnails: ThumbnailCache::new(thumbnail_size),
            thumbnail_methods: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of stereograms in the store
    pub fn count(&self) -> usize {
        self.stereograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stereograms.is_empty()
    }

    pub fn thumbnail_size(&self) -> u32 {
        self.thumbnails.thumbnail_size()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stereogram> {
        self.stereograms.iter()
    }

    /// Position of the stereogram stored in `base_dir`
    pub fn index_of(&self, base_dir: &Path) -> Option<usize> {
        self.stereograms.iter().position(|s| s.base_dir() == base_dir)
    }

    /// Add an already created and saved stereogram
    ///
    /// Returns false, leaving the store unchanged, if it is already contained.
    pub fn add(&mut self, mut stereogram: Stereogram) -> bool {
        if self.index_of(stereogram.base_dir()).is_some() {
            debug!(path = %stereogram.base_dir().display(), "Stereogram already in store");
            return false;
        }
        stereogram.set_thumbnail_size(self.thumbnail_size());
        self.stereograms.push(stereogram);
        true
    }

    /// Create a new stereogram from two images, save it and add it to the store
    pub fn create_stereogram(
        &mut self,
        left: &DynamicImage,
        right: &DynamicImage,
    ) -> StoreResult<&mut Stereogram> {
        let mut stereogram = Stereogram::create_and_save(left, right, &self.root)?;
        stereogram.set_thumbnail_size(self.thumbnail_size());
        self.stereograms.push(stereogram);

        let index = self.stereograms.len() - 1;
        Ok(&mut self.stereograms[index])
    }

    pub fn stereogram_at(&self, index: usize) -> StoreResult<&Stereogram> {
        let count = self.count();
        self.stereograms
            .get(index)
            .ok_or_else(|| StoreError::index_out_of_bounds(index, count))
    }

    pub fn stereogram_at_mut(&mut self, index: usize) -> StoreResult<&mut Stereogram> {
        let count = self.count();
        self.stereograms
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_bounds(index, count))
    }

    /// Delete the stereograms at `indices` from disk and from the store
    ///
    /// Indices refer to positions before any deletion. Stops at the first
    /// failure; stereograms already deleted stay deleted.
    pub fn delete_at_indices(&mut self, indices: &[usize]) -> StoreResult<()> {
        let mut indices = indices.to_vec();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();

        for index in indices {
            self.delete_at(index)?;
        }
        Ok(())
    }

    /// Delete the stereogram stored in `base_dir`
    pub fn delete(&mut self, base_dir: &Path) -> StoreResult<()> {
        let index = self.index_of(base_dir).ok_or_else(|| {
            StoreError::new(
                ErrorCode::FileNotFound,
                format!("No stereogram at {} in this store", base_dir.display()),
            )
        })?;
        self.delete_at(index)
    }

    fn delete_at(&mut self, index: usize) -> StoreResult<()> {
        let base_dir = self.stereogram_at(index)?.base_dir().to_path_buf();

        storage::remove_record_dir(&base_dir)?;
        self.stereograms.remove(index);
        self.forget_thumbnail(&base_dir);
        Ok(())
    }

    /// Replace the stereogram at `index` with `stereogram`
    ///
    /// There must already be a stereogram at `index`. The replaced record is
    /// deleted from disk unless it is the same record.
    pub fn replace_at(&mut self, index: usize, mut stereogram: Stereogram) -> StoreResult<()> {
        let old_dir = self.stereogram_at(index)?.base_dir().to_path_buf();

        if let Some(existing) = self.index_of(stereogram.base_dir())
            && existing != index
        {
            return Err(StoreError::new(
                ErrorCode::UnknownError,
                format!(
                    "{} is already in the store at index {}",
                    stereogram.base_dir().display(),
                    existing
                ),
            ));
        }

        if old_dir != stereogram.base_dir() {
            storage::remove_record_dir(&old_dir)?;
        }

        self.forget_thumbnail(&old_dir);
        stereogram.set_thumbnail_size(self.thumbnail_size());
        self.stereograms[index] = stereogram;
        Ok(())
    }

    /// Toggle the stereogram at `index` between cross-eye and wall-eye
    ///
    /// Returns the new viewing method.
    pub fn change_viewing_method(&mut self, index: usize) -> StoreResult<ViewingMethod> {
        let method = self.stereogram_at(index)?.viewing_method().toggled();
        self.set_viewing_method(index, method)?;
        Ok(method)
    }

    pub fn set_viewing_method(&mut self, index: usize, method: ViewingMethod) -> StoreResult<()> {
        let stereogram = self.stereogram_at_mut(index)?;
        let base_dir = stereogram.base_dir().to_path_buf();
        stereogram.set_viewing_method(method)?;
        self.forget_thumbnail(&base_dir);
        Ok(())
    }

    /// Thumbnail of the stereogram image at `index`
    ///
    /// A cached thumbnail is only served while the record still has the
    /// viewing method it was made with, however that method was changed.
    pub fn thumbnail_at(&mut self, index: usize) -> StoreResult<Arc<RgbaImage>> {
        let count = self.stereograms.len();
        let stereogram = self
            .stereograms
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_bounds(index, count))?;

        let key = stereogram.base_dir().to_path_buf();
        let method = stereogram.viewing_method();
        if self.thumbnails.contains(&key) && self.thumbnail_methods.get(&key) == Some(&method) {
            return self.thumbnails.thumbnail_for_key(&key);
        }

        let image = stereogram.stereogram_image()?;
        self.thumbnail_methods.insert(key.clone(), method);
        Ok(self.thumbnails.add_thumbnail_for_image(&image, &key))
    }

    fn forget_thumbnail(&mut self, base_dir: &Path) {
        self.thumbnails.remove(base_dir);
        self.thumbnail_methods.remove(base_dir);
    }

    /// Copy the stereogram at `index` into the camera-roll directory
    ///
    /// Returns the path of the exported file.
    pub fn copy_to_camera_roll(
        &mut self,
        index: usize,
        destination: &Path,
        config: &ComposeConfig,
    ) -> StoreResult<PathBuf> {
        let data = self.stereogram_at_mut(index)?.export_data(config)?;
        let path = compose::save_blocking(&data, destination)?;
        info!(index, path = %path.display(), mime_type = data.mime_type, "Exported stereogram");
        Ok(path)
    }

    /// Drop every cached image (composed images and thumbnails)
    pub fn release_cached_images(&mut self) {
        for stereogram in &mut self.stereograms {
            stereogram.release_cached_images();
        }
        self.thumbnails.clear();
        self.thumbnail_methods.clear();
    }
}
