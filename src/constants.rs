// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Edge length in pixels of the square box thumbnails are scaled into
pub const THUMBNAIL_SIZE: u32 = 100;

/// Save-file version written into every property file
///
/// Property files with a greater version are rejected as an invalid format.
pub const PROPERTIES_VERSION: u32 = 1;

/// On-disk layout of a single stereogram record
pub mod layout {
    /// Left-eye image inside a record directory
    pub const LEFT_IMAGE: &str = "left.jpg";
    /// Right-eye image inside a record directory
    pub const RIGHT_IMAGE: &str = "right.jpg";
    /// Property file inside a record directory
    pub const PROPERTIES: &str = "properties.json";
    /// Cached thumbnail inside a record directory
    pub const THUMBNAIL: &str = "thumbnail.png";
}

/// Default folder names under the user's directories
pub mod folders {
    /// Application folder under the data and config directories
    pub const APP: &str = "stereogram";
    /// Folder under the pictures directory that stands in for the camera roll
    pub const EXPORT: &str = "Stereograms";
    /// Store folder under the data directory
    pub const STORE: &str = "store";
    /// Config file name under the config directory
    pub const CONFIG_FILE: &str = "config.json";
}

/// Timing for animated GIF exports
pub mod animation {
    use super::Duration;

    /// Delay between the left and right frames
    pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(150);
    /// Shortest delay accepted from configuration
    pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names_are_distinct() {
        let names = [
            layout::LEFT_IMAGE,
            layout::RIGHT_IMAGE,
            layout::PROPERTIES,
            layout::THUMBNAIL,
        ];
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_frame_delay_bounds() {
        assert!(animation::DEFAULT_FRAME_DELAY >= animation::MIN_FRAME_DELAY);
    }
}
