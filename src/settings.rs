//! Game settings and preferences
//!
//! Persisted separately from the session, in a JSON file next to the
//! executable's working directory. Missing or unreadable settings fall back
//! to defaults; a bad file is never fatal.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Gameplay ===
    /// Paddle follows the pointer instead of keyboard steering
    pub pointer_control: bool,
    /// Run seed override (None = derive from settings-independent source)
    pub fixed_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            pointer_control: true,
            fixed_seed: None,
        }
    }
}

impl Settings {
    /// Settings file name
    pub const FILE_NAME: &'static str = "brickfall_settings.json";

    /// Load settings from the given file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings file: {err}");
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to the given file
    pub fn save(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::warn!("Failed to save settings: {err}");
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(err) => log::warn!("Failed to serialize settings: {err}"),
        }
    }
}
