// SPDX-License-Identifier: GPL-3.0-only

//! Property file stored alongside each stereogram's images

use crate::constants::PROPERTIES_VERSION;
use crate::errors::{ErrorCode, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// The ways of displaying the stereogram image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewingMethod {
    /// Images side by side, view cross-eyed
    #[default]
    CrossEye,
    /// Images side by side with the halves swapped, view wall-eyed
    WallEye,
    /// Images superimposed as an anaglyph, view with red/green glasses
    RedGreen,
    /// Single-image "magic eye" stereogram
    RandomDot,
    /// Images shown alternately as frames of an animation
    AnimatedGif,
}

impl ViewingMethod {
    pub const ALL: [ViewingMethod; 5] = [
        ViewingMethod::CrossEye,
        ViewingMethod::WallEye,
        ViewingMethod::RedGreen,
        ViewingMethod::RandomDot,
        ViewingMethod::AnimatedGif,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ViewingMethod::CrossEye => "Cross-eye",
            ViewingMethod::WallEye => "Wall-eye",
            ViewingMethod::RedGreen => "Red/Green",
            ViewingMethod::RandomDot => "Random dot",
            ViewingMethod::AnimatedGif => "Animated GIF",
        }
    }

    /// Key used on the command line and in the property file
    pub fn key(&self) -> &'static str {
        match self {
            ViewingMethod::CrossEye => "cross_eye",
            ViewingMethod::WallEye => "wall_eye",
            ViewingMethod::RedGreen => "red_green",
            ViewingMethod::RandomDot => "random_dot",
            ViewingMethod::AnimatedGif => "animated_gif",
        }
    }

    /// Cross-eye becomes wall-eye and vice versa; other methods are unchanged
    pub fn toggled(self) -> Self {
        match self {
            ViewingMethod::CrossEye => ViewingMethod::WallEye,
            ViewingMethod::WallEye => ViewingMethod::CrossEye,
            other => other,
        }
    }
}

impl fmt::Display for ViewingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ViewingMethod {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' ', '/'], "_");
        ViewingMethod::ALL
            .into_iter()
            .find(|m| m.key() == normalized)
            .or(match normalized.as_str() {
                "cross" | "crosseye" => Some(ViewingMethod::CrossEye),
                "wall" | "walleye" => Some(ViewingMethod::WallEye),
                "anaglyph" | "redgreen" => Some(ViewingMethod::RedGreen),
                "gif" | "animated" => Some(ViewingMethod::AnimatedGif),
                _ => None,
            })
            .ok_or_else(|| {
                StoreError::new(
                    ErrorCode::InvalidFileFormat,
                    format!("Unknown viewing method '{}'", s),
                )
            })
    }
}

/// Portrait or landscape, taken from the left image when the pair is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// Contents of a stereogram's property file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// Save file version
    pub version: u32,
    /// How the user wants this stereogram displayed
    pub view_mode: ViewingMethod,
    /// When the original photos were taken
    pub date_taken: DateTime<Utc>,
    #[serde(default)]
    pub orientation: Orientation,
    /// File name of the cached thumbnail inside the record, if one was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Properties {
    pub fn new(date_taken: DateTime<Utc>, orientation: Orientation) -> Self {
        Self {
            version: PROPERTIES_VERSION,
            view_mode: ViewingMethod::default(),
            date_taken,
            orientation,
            thumbnail: None,
        }
    }

    /// Convert to JSON string for the property file
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from the property file contents
    ///
    /// Newer save file versions are rejected rather than half-read.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let properties: Properties = serde_json::from_str(json)?;
        if properties.version > PROPERTIES_VERSION {
            return Err(StoreError::new(
                ErrorCode::InvalidFileFormat,
                format!(
                    "Property file version {} is newer than supported version {}",
                    properties.version, PROPERTIES_VERSION
                ),
            ));
        }
        Ok(properties)
    }

    /// Read the property file at `path`
    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StoreError::new(
                ErrorCode::CouldntLoadImageProperties,
                format!("Could not read {}: {}", path.display(), e),
            )
        })?;
        debug!(path = %path.display(), "Loaded property file");
        Self::from_json(&json)
    }

    /// Write the property file at `path`
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), view_mode = ?self.view_mode, "Saved property file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Properties {
        let date = Utc.with_ymd_and_hms(2015, 6, 2, 10, 30, 0).unwrap();
        Properties::new(date, Orientation::Portrait)
    }

    #[test]
    fn test_toggle_cross_and_wall() {
        assert_eq!(ViewingMethod::CrossEye.toggled(), ViewingMethod::WallEye);
        assert_eq!(ViewingMethod::WallEye.toggled(), ViewingMethod::CrossEye);
        assert_eq!(ViewingMethod::RedGreen.toggled(), ViewingMethod::RedGreen);
        assert_eq!(ViewingMethod::AnimatedGif.toggled(), ViewingMethod::AnimatedGif);
    }

    #[test]
    fn test_parse_viewing_method() {
        assert_eq!("cross-eye".parse::<ViewingMethod>().unwrap(), ViewingMethod::CrossEye);
        assert_eq!("Wall Eye".parse::<ViewingMethod>().unwrap(), ViewingMethod::WallEye);
        assert_eq!("red/green".parse::<ViewingMethod>().unwrap(), ViewingMethod::RedGreen);
        assert_eq!("gif".parse::<ViewingMethod>().unwrap(), ViewingMethod::AnimatedGif);
        assert!("sideways".parse::<ViewingMethod>().is_err());

        for method in ViewingMethod::ALL {
            assert_eq!(method.key().parse::<ViewingMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_orientation_from_dimensions() {
        assert_eq!(Orientation::from_dimensions(30, 40), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(40, 30), Orientation::Landscape);
        assert_eq!(Orientation::from_dimensions(40, 40), Orientation::Landscape);
    }

    #[test]
    fn test_serialization() {
        let mut properties = sample();
        properties.view_mode = ViewingMethod::RedGreen;
        properties.thumbnail = Some("thumbnail.png".to_string());

        let json = properties.to_json().unwrap();
        assert!(json.contains("\"red_green\""));

        let restored = Properties::from_json(&json).unwrap();
        assert_eq!(properties, restored);
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut properties = sample();
        properties.version = PROPERTIES_VERSION + 1;
        let json = properties.to_json().unwrap();

        let err = Properties::from_json(&json).unwrap_err();
        assert!(err.is(ErrorCode::InvalidFileFormat));
    }

    #[test]
    fn test_garbage_is_invalid_format() {
        let err = Properties::from_json("not json").unwrap_err();
        assert!(err.is(ErrorCode::InvalidFileFormat));
    }

    #[test]
    fn test_missing_file_cannot_load_properties() {
        let err = Properties::load(Path::new("/nonexistent/properties.json")).unwrap_err();
        assert!(err.is(ErrorCode::CouldntLoadImageProperties));
    }
}
