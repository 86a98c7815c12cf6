//! Settings read once when a selection session starts

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::{Rect, RectF};

/// Whether the last accepted region is offered again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionMemory {
    #[default]
    Never,
    /// Only while the application keeps running
    UntilClosed,
    /// Across restarts
    Always,
}

/// Editor configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Accept as soon as a freshly drawn rectangle is released
    pub release_to_capture: bool,
    pub remember_last_region: RegionMemory,
    /// Dim the unselected area with white instead of black
    pub light_mask_color: bool,
    pub show_magnifier: bool,
    /// Last accepted region as x, y, width, height in device pixels
    pub crop_region: [i32; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            release_to_capture: false,
            remember_last_region: RegionMemory::Never,
            light_mask_color: false,
            show_magnifier: false,
            crop_region: [0; 4],
        }
    }
}

impl Settings {
    pub const APP_DIR: &'static str = "clipframe";
    pub const FILE_NAME: &'static str = "settings.json";

    /// `<config dir>/clipframe/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    /// Load settings from `path`, or return defaults if unavailable
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Error loading settings, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save settings to `path`, creating the parent directory
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Forget a stored region unless it should survive restarts. Call once
    /// after loading at application start.
    pub fn start_session(&mut self) {
        if self.remember_last_region != RegionMemory::Always {
            self.crop_region = [0; 4];
        }
    }

    /// Dimming color drawn over the unselected area, as RGBA
    pub fn mask_color(&self) -> [u8; 4] {
        if self.light_mask_color {
            [255, 255, 255, 127]
        } else {
            [0, 0, 0, 127]
        }
    }

    /// Stored region in device pixels, if one is remembered
    pub fn crop_rect(&self) -> Option<RectF> {
        if self.remember_last_region == RegionMemory::Never {
            return None;
        }
        let [x, y, w, h] = self.crop_region;
        let rect = Rect::from_xywh(x, y, w, h);
        rect.dimensions().map(|_| RectF::from(rect))
    }

    pub fn set_crop_rect(&mut self, rect: Rect) {
        self.crop_region = [rect.left, rect.top, rect.width(), rect.height()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").expect("write");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"release_to_capture": true, "remember_last_region": "Always"}"#)
            .expect("write");
        let settings = Settings::load(&path);
        assert!(settings.release_to_capture);
        assert_eq!(settings.remember_last_region, RegionMemory::Always);
        assert!(!settings.show_magnifier);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(Settings::FILE_NAME);
        let mut settings = Settings {
            light_mask_color: true,
            remember_last_region: RegionMemory::UntilClosed,
            ..Settings::default()
        };
        settings.set_crop_rect(Rect::from_xywh(10, 20, 300, 200));
        settings.save(&path).expect("save");
        let loaded = Settings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.mask_color(), [255, 255, 255, 127]);
    }

    #[test]
    fn region_survives_restart_only_when_always() {
        let mut settings = Settings {
            remember_last_region: RegionMemory::UntilClosed,
            crop_region: [1, 2, 3, 4],
            ..Settings::default()
        };
        assert_eq!(settings.crop_rect(), Some(RectF::new(1.0, 2.0, 3.0, 4.0)));
        settings.start_session();
        assert_eq!(settings.crop_rect(), None);

        settings.remember_last_region = RegionMemory::Always;
        settings.crop_region = [1, 2, 3, 4];
        settings.start_session();
        assert_eq!(settings.crop_region, [1, 2, 3, 4]);
    }

    #[test]
    fn empty_region_is_not_offered() {
        let settings = Settings {
            remember_last_region: RegionMemory::Always,
            crop_region: [5, 5, 0, 10],
            ..Settings::default()
        };
        assert_eq!(settings.crop_rect(), None);
    }
}
