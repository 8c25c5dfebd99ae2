use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ── WindowMode ────────────────────────────────────────────────────────────────

/// Controls how the OS window is presented.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Standard decorated window at the configured resolution.
    Windowed,
    /// Exclusive hardware fullscreen at the configured resolution.
    Fullscreen,
    /// Borderless window sized to match the monitor's native resolution.
    Borderless,
}

// ── WindowConfig ──────────────────────────────────────────────────────────────

/// Window configuration snapshot.
///
/// - **physical** dimensions are the pixel size requested for the OS window.
/// - **logical** dimensions are the game resolution scenes draw at; the
///   framebuffer handed to `Scene::render` always has this size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Actual window width in physical pixels.
    pub physical_width: u32,
    /// Actual window height in physical pixels.
    pub physical_height: u32,
    /// Internal game / render resolution width.
    pub logical_width: u32,
    /// Internal game / render resolution height.
    pub logical_height: u32,
    pub mode: WindowMode,
    /// PNG used as the window icon, scaled to 32 × 32.
    pub icon: Option<PathBuf>,
}

impl Default for WindowConfig {
    /// 1280 × 720, windowed, no icon.
    fn default() -> Self {
        Self {
            title:           String::from("scenebase"),
            physical_width:  1280,
            physical_height: 720,
            logical_width:   1280,
            logical_height:  720,
            mode:            WindowMode::Windowed,
            icon:            None,
        }
    }
}

impl WindowConfig {
    /// Same physical and logical resolution.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            physical_width: width,
            physical_height: height,
            logical_width: width,
            logical_height: height,
            ..Self::default()
        }
    }

    /// Aspect ratio of the **logical** resolution (`logical_width / logical_height`).
    ///
    /// Returns `0.0` when `logical_height` is zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.logical_height == 0 {
            return 0.0;
        }
        self.logical_width as f32 / self.logical_height as f32
    }

    /// Ratio of physical to logical size on each axis. Zero logical size
    /// yields `(1, 1)`.
    pub fn scale_factors(&self) -> (f32, f32) {
        if self.logical_width == 0 || self.logical_height == 0 {
            return (1.0, 1.0);
        }
        (
            self.physical_width as f32 / self.logical_width as f32,
            self.physical_height as f32 / self.logical_height as f32,
        )
    }
}
