// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for store operations
//!
//! This module provides command-line functionality for:
//! - Listing and creating stereograms
//! - Changing how they are viewed
//! - Exporting, deleting and previewing them

use chrono::Local;
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stereogram::pipelines::compose::{self, ComposePipeline, processing};
use stereogram::{Config, PhotoStore, ViewingMethod, storage};

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn open_store(config: &Config) -> Result<PhotoStore, Box<dyn std::error::Error>> {
    Ok(PhotoStore::with_thumbnail_size(
        &config.store_dir,
        config.thumbnail_size,
    )?)
}

/// List all stereograms in the store
pub fn list(config: &Config) -> CliResult {
    let store = open_store(config)?;

    if store.is_empty() {
        println!("No stereograms in {}.", store.root().display());
        return Ok(());
    }

    println!("Stereograms in {}:", store.root().display());
    println!();
    for (index, stereogram) in store.iter().enumerate() {
        let taken = stereogram.date_taken().with_timezone(&Local);
        println!(
            "  [{}] {}  {}",
            index,
            taken.format("%Y-%m-%d %H:%M:%S"),
            stereogram.viewing_method()
        );
        println!("      {}", stereogram.base_dir().display());
    }

    if let Some(last) = storage::latest_file_with_extensions(&config.export_dir, &["jpg", "gif"]) {
        println!();
        println!("Last export: {}", last.display());
    }

    Ok(())
}

/// Create a stereogram from two image files
pub fn create(config: &Config, left: &Path, right: &Path) -> CliResult {
    let left = processing::load_image(left)?;
    let right = processing::load_image(right)?;
    add_pair(config, &left, &right)
}

/// Create a stereogram from one side-by-side image
pub fn split(config: &Config, image: &Path) -> CliResult {
    let image = processing::load_image(image)?.to_rgba8();
    if image.width() < 2 {
        return Err(format!("Image is {} pixel(s) wide, too narrow to split", image.width()).into());
    }

    let (left, right) = processing::split_pair(&image);
    add_pair(
        config,
        &DynamicImage::ImageRgba8(left),
        &DynamicImage::ImageRgba8(right),
    )
}

fn add_pair(config: &Config, left: &DynamicImage, right: &DynamicImage) -> CliResult {
    let mut store = open_store(config)?;
    let stereogram = store.create_stereogram(left, right)?;
    stereogram.set_viewing_method(config.default_viewing_method)?;
    let base_dir = stereogram.base_dir().to_path_buf();

    println!("Created stereogram [{}]: {}", store.count() - 1, base_dir.display());
    Ok(())
}

/// Write the composed image of a stereogram
pub fn show(config: &Config, index: usize, output: Option<PathBuf>) -> CliResult {
    let store = open_store(config)?;
    let stereogram = store.stereogram_at(index)?;
    let left = Arc::new(stereogram.left_image()?);
    let right = Arc::new(stereogram.right_image()?);
    let method = stereogram.viewing_method();

    println!("Composing ({})...", method);
    let pipeline = ComposePipeline::new(config.compose_config());

    // Create async runtime for the pipeline
    let rt = tokio::runtime::Runtime::new()?;
    let output_path = rt.block_on(compose_to(&pipeline, left, right, method, output))?;

    println!("Stereogram saved: {}", output_path.display());
    Ok(())
}

async fn compose_to(
    pipeline: &ComposePipeline,
    left: Arc<RgbaImage>,
    right: Arc<RgbaImage>,
    method: ViewingMethod,
    output: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let Some(path) = output else {
        return Ok(pipeline
            .compose_and_save(left, right, method, PathBuf::from("."))
            .await?);
    };

    let encoded = pipeline.compose_and_encode(left, right, method).await?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &encoded.bytes).await?;
    Ok(path)
}

/// Set the viewing method of a stereogram
pub fn set_method(config: &Config, index: usize, method: ViewingMethod) -> CliResult {
    let mut store = open_store(config)?;
    store.set_viewing_method(index, method)?;
    println!("[{}] now uses {}", index, method);
    Ok(())
}

/// Switch a stereogram between cross-eye and wall-eye
pub fn toggle(config: &Config, index: usize) -> CliResult {
    let mut store = open_store(config)?;
    let method = store.change_viewing_method(index)?;
    println!("[{}] now uses {}", index, method);
    Ok(())
}

/// Copy a stereogram to the export directory
pub fn export(config: &Config, index: usize, dir: Option<PathBuf>) -> CliResult {
    let mut store = open_store(config)?;
    let destination = dir.unwrap_or_else(|| config.export_dir.clone());

    let path = store.copy_to_camera_roll(index, &destination, &config.compose_config())?;
    println!("Exported: {}", path.display());
    Ok(())
}

/// Delete stereograms by index
pub fn delete(config: &Config, indices: &[usize]) -> CliResult {
    let mut store = open_store(config)?;

    // Check everything up front so a bad index doesn't leave a partial delete
    for &index in indices {
        store.stereogram_at(index)?;
    }

    let before = store.count();
    store.delete_at_indices(indices)?;
    println!("Deleted {} stereogram(s)", before - store.count());
    Ok(())
}

/// Write the thumbnail of a stereogram
pub fn thumbnail(config: &Config, index: usize, output: Option<PathBuf>) -> CliResult {
    let mut store = open_store(config)?;
    let thumbnail = store.thumbnail_at(index)?;

    let path = output.unwrap_or_else(|| PathBuf::from(format!("thumbnail_{}.png", index)));
    let encoded = compose::encoding::encode(
        &thumbnail,
        compose::EncodingFormat::Png,
        compose::EncodingQuality::default(),
    )?;
    std::fs::write(&path, &encoded.bytes)?;

    println!(
        "Thumbnail ({}x{}) saved: {}",
        thumbnail.width(),
        thumbnail.height(),
        path.display()
    );
    Ok(())
}
