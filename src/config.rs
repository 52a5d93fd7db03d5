// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{THUMBNAIL_SIZE, animation, folders};
use crate::errors::StoreResult;
use crate::pipelines::compose::{ComposeConfig, EncodingFormat, EncodingQuality};
use crate::stereogram::ViewingMethod;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// User configuration, stored as JSON in the user's config directory
///
/// Unknown keys are ignored and missing keys take their default, so older
/// and newer config files both load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory of the photo store
    pub store_dir: PathBuf,
    /// Directory exports are copied into (stands in for the camera roll)
    pub export_dir: PathBuf,
    /// Edge length of the square thumbnail box, in pixels
    pub thumbnail_size: u32,
    /// JPEG quality for exports
    pub export_quality: EncodingQuality,
    /// Delay between frames of animated GIF exports, in milliseconds
    pub frame_delay_ms: u64,
    /// Viewing method given to newly created stereograms
    pub default_viewing_method: ViewingMethod,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            export_dir: default_export_dir(),
            thumbnail_size: THUMBNAIL_SIZE,
            export_quality: EncodingQuality::default(),
            frame_delay_ms: animation::DEFAULT_FRAME_DELAY.as_millis() as u64,
            default_viewing_method: ViewingMethod::default(),
        }
    }
}

impl Config {
    /// Location of the config file, if the platform has a config directory
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(folders::APP).join(folders::CONFIG_FILE))
    }

    /// Load the user's config
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Self::default()
            }
        }
    }

    /// Load the config at `path`
    ///
    /// A missing file gives the defaults; an unreadable or malformed one is
    /// reported and also gives the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&json)?;
        debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Frame delay, clamped to the shortest delay GIF viewers honour
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms).max(animation::MIN_FRAME_DELAY)
    }

    /// Settings for exports
    pub fn compose_config(&self) -> ComposeConfig {
        ComposeConfig {
            format: EncodingFormat::Jpeg,
            quality: self.export_quality,
            frame_delay: self.frame_delay(),
        }
    }
}

/// Get default store directory
fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folders::APP)
        .join(folders::STORE)
}

/// Get default export directory
fn default_export_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join(folders::EXPORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "thumbnail_size": 64 }"#).unwrap();
        assert_eq!(config.thumbnail_size, 64);
        assert_eq!(config.export_quality, EncodingQuality::High);
        assert_eq!(config.default_viewing_method, ViewingMethod::CrossEye);
    }

    #[test]
    fn test_frame_delay_clamped() {
        let config = Config {
            frame_delay_ms: 1,
            ..Config::default()
        };
        assert_eq!(config.frame_delay(), animation::MIN_FRAME_DELAY);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.json");
        let config = Config {
            store_dir: dir.path().join("store"),
            default_viewing_method: ViewingMethod::AnimatedGif,
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
