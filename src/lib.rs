// SPDX-License-Identifier: GPL-3.0-only

//! Stereogram - a store of stereo image pairs
//!
//! This library keeps left/right photo pairs on disk, composes them into
//! viewable stereograms and exports the result.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`stereogram`]: A single stereo pair and its property file
//! - [`store`]: The collection of all pairs under one directory
//! - [`thumbnail_cache`]: In-memory thumbnails keyed by path
//! - [`pipelines`]: Compositing and encoding of pairs
//! - [`config`]: User configuration handling
//! - [`storage`]: Record directory management
//!
//! # Example
//!
//! ```no_run
//! use stereogram::{PhotoStore, ViewingMethod};
//!
//! let mut store = PhotoStore::open("/tmp/stereograms")?;
//! if !store.is_empty() {
//!     store.stereogram_at_mut(0)?.set_viewing_method(ViewingMethod::WallEye)?;
//! }
//! # Ok::<(), stereogram::StoreError>(())
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod stereogram;
pub mod store;
pub mod thumbnail_cache;

// Re-export commonly used types
pub use config::Config;
pub use errors::{ErrorCode, StoreError, StoreResult};
pub use stereogram::{Orientation, Properties, Stereogram, ViewingMethod};
pub use store::PhotoStore;
pub use thumbnail_cache::ThumbnailCache;
