/// Application settings and data locations
///
/// Settings live in `<config dir>/leica-minimap/settings.json`:
/// - Linux: ~/.config/leica-minimap/settings.json
/// - macOS: ~/Library/Application Support/leica-minimap/settings.json
/// - Windows: %APPDATA%\leica-minimap\settings.json
///
/// Every field is optional in the file; missing ones take their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::thumbnail::DEFAULT_THUMBNAIL_WIDTH;

/// Shared lab folder, used as the data root when it exists
const LAB_DROPBOX: &str = "Dropbox (DGG Lab)";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Thumbnail width in pixels
    pub thumbnail_width: u32,
    /// Period of the thumbnail sweep tick
    pub sweep_interval_ms: u64,
    /// Minimap viewport, in display units
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Root for captured images and annotations, overriding the default
    pub data_root: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            sweep_interval_ms: 100,
            viewport_width: 640.0,
            viewport_height: 480.0,
            data_root: None,
        }
    }
}

impl Settings {
    /// Load from the user's config directory, falling back to defaults
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file. A missing file is not an error; a broken
    /// one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };

        match serde_json::from_str(&text) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded settings");
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring invalid settings file: {e}");
                Self::default()
            }
        }
    }

    /// Directory receiving copied images and annotation records
    pub fn capture_dir(&self) -> PathBuf {
        let root = self.data_root.clone().unwrap_or_else(default_data_root);
        root.join("leica_cv").join("data")
    }
}

/// Path to the settings file, if the platform has a config directory
pub fn settings_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("leica-minimap");
    path.push("settings.json");
    Some(path)
}

/// The lab's shared Dropbox when present on this machine, otherwise home
fn default_data_root() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let dropbox = home.join(LAB_DROPBOX);
    if dropbox.is_dir() {
        dropbox
    } else {
        home
    }
}
