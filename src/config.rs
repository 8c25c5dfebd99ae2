use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::window::WindowConfig;

/// Default fixed tick rate of the program loop, in iterations per second.
pub const DEFAULT_TICK_RATE: u32 = 120;

/// Music settings read at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    /// Directory listed for tracks. Index 0 is the menu theme and the last
    /// index the credits track.
    pub folder: PathBuf,
    /// Player-chosen volume, 0..=100.
    pub volume_percent: u8,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("songs"),
            volume_percent: 100,
        }
    }
}

/// Top-level configuration for a [`crate::engine::Program`].
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```
/// let cfg: scenebase::config::GameConfig =
///     serde_json::from_str(r#"{ "tick_rate": 60 }"#).unwrap();
/// assert_eq!(cfg.tick_rate, 60);
/// assert_eq!(cfg.window.logical_width, 1280);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    /// `None` runs without music.
    pub music: Option<MusicConfig>,
    /// Folder holding `<family>.json` + `<family>.png` bitmap fonts.
    pub fonts_folder: Option<PathBuf>,
    pub tick_rate: u32,
    /// Ramp the music volume up one step per tick in every scene whose
    /// level id is not 0 (the menu).
    pub fade_music: bool,
    /// Pick a new random track when the current one ends.
    pub shuffle_on_track_end: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            music: None,
            fonts_folder: None,
            tick_rate: DEFAULT_TICK_RATE,
            fade_music: false,
            shuffle_on_track_end: false,
        }
    }
}

impl GameConfig {
    /// Default configuration at the given resolution.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            window: WindowConfig::with_size(width, height),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_json(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded config");
        Ok(cfg)
    }
}
