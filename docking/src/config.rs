//! Docking configuration
//!
//! Every tunable of the docking engine lives in [`DockingConfig`]. The
//! configuration can be persisted as JSON next to the layout file.

use crate::error::DockError;
use crate::input::DisableDockingModifier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Tunables for snapping, drop zones and drag behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    /// Distance in pixels within which a floating rectangle snaps to an edge
    pub snap_threshold: i32,
    /// Thickness of the relative (trapezoid) drop zones
    pub drop_zone_size: i32,
    /// Targets narrower or shorter than this get proportionally smaller zones
    pub minimum_drop_zone_target: i32,
    /// Fraction of the target size used for zones on small targets
    pub drop_zone_scale: f32,
    /// Diameter of the tab circle relative to the inner rectangle
    pub center_tab_zone_scale: f32,
    /// Thickness of the absolute zones along the root container edges
    pub absolute_drop_zone_size: i32,
    /// Hover opacity at which a drop zone is considered fully faded in
    pub drop_zone_opacity: f32,
    /// Opacity gained on every fade tick
    pub drop_zone_fade_increment: f32,
    /// Interval between fade ticks in milliseconds
    pub drop_zone_fade_interval_ms: u64,
    /// Opacity of the ghost visual while dragging
    pub ghost_opacity: f32,
    /// Manhattan distance the pointer must travel before a press becomes a drag
    pub start_drag_distance: i32,
    /// Dropping on a pane edge always tabs instead of splitting
    pub force_tabbed_docks: bool,
    /// Holding this modifier disables docking while dragging
    pub disable_docking_modifier: DisableDockingModifier,
    /// Prefix of generated floating container and tab group names
    pub identifier_prefix: String,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 15,
            drop_zone_size: 40,
            minimum_drop_zone_target: 160,
            drop_zone_scale: 0.25,
            center_tab_zone_scale: 0.6,
            absolute_drop_zone_size: 40,
            drop_zone_opacity: 0.4,
            drop_zone_fade_increment: 0.05,
            drop_zone_fade_interval_ms: 20,
            ghost_opacity: 0.6,
            start_drag_distance: 10,
            force_tabbed_docks: false,
            disable_docking_modifier: DisableDockingModifier::Control,
            identifier_prefix: "Dock".to_string(),
        }
    }
}

impl DockingConfig {
    /// Interval at which the host should call `advance_drop_zone_fade`
    pub fn fade_interval(&self) -> Duration {
        Duration::from_millis(self.drop_zone_fade_interval_ms)
    }

    /// Zone thickness along one axis of a target of the given extent
    ///
    /// Small targets get zones proportional to their size so that the tab
    /// circle keeps some room in the middle.
    pub fn zone_extent(&self, extent: i32) -> i32 {
        if extent < self.minimum_drop_zone_target {
            (extent as f32 * self.drop_zone_scale) as i32
        } else {
            self.drop_zone_size
        }
    }

    /// Save the configuration to a specific path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), DockError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        info!("Saved docking config to {:?}", path.as_ref());
        Ok(())
    }

    /// Load the configuration from a specific path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, DockError> {
        let content = std::fs::read_to_string(&path)?;
        let config = serde_json::from_str(&content)?;
        info!("Loaded docking config from {:?}", path.as_ref());
        Ok(config)
    }

    /// Load the configuration, falling back to defaults on any failure
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No docking config found, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load docking config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = DockingConfig::default();
        assert_eq!(config.snap_threshold, 15);
        assert_eq!(config.drop_zone_size, 40);
        assert_eq!(config.absolute_drop_zone_size, 40);
        assert_eq!(config.center_tab_zone_scale, 0.6);
        assert!(!config.force_tabbed_docks);
        assert_eq!(config.fade_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_zone_size_scales_for_small_targets() {
        let config = DockingConfig::default();
        assert_eq!(config.zone_extent(300), 40);
        assert_eq!(config.zone_extent(100), 25);
    }

    #[test]
    fn test_save_load_config() {
        let mut config = DockingConfig::default();
        config.snap_threshold = 8;
        config.force_tabbed_docks = true;

        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        config
            .save_to(temp_file.path())
            .expect("Failed to save config");

        let loaded = DockingConfig::load_from(temp_file.path()).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        std::fs::write(temp_file.path(), r#"{ "snap_threshold": 4 }"#)
            .expect("Failed to write file");

        let loaded = DockingConfig::load_from(temp_file.path()).expect("Failed to load config");
        assert_eq!(loaded.snap_threshold, 4);
        assert_eq!(loaded.drop_zone_size, 40);
    }

    #[test]
    fn test_invalid_json_fallback() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        std::fs::write(temp_file.path(), "{ invalid json }").expect("Failed to write file");

        assert!(DockingConfig::load_from(temp_file.path()).is_err());
        assert_eq!(
            DockingConfig::load_or_default(temp_file.path()),
            DockingConfig::default()
        );
    }
}
