pub mod config;

use std::path::Path;

pub use config::{WindowConfig, WindowMode};

use image::imageops::FilterType;
use winit::dpi::PhysicalSize;
use winit::window::{Fullscreen, Icon, Window, WindowAttributes};

use crate::error::{Error, Result};

/// Edge length the window icon is scaled to before it is handed to the OS.
pub const ICON_SIZE: u32 = 32;

/// Build the attributes for the game window: title, fixed physical size and,
/// when configured, the icon.
///
/// A missing or undecodable icon is an error; the caller decides whether to
/// start without one.
pub fn window_attributes(config: &WindowConfig) -> Result<WindowAttributes> {
    let mut attrs = Window::default_attributes()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(
            config.physical_width.max(1),
            config.physical_height.max(1),
        ))
        .with_resizable(false);

    if let Some(path) = &config.icon {
        attrs = attrs.with_window_icon(Some(load_icon(path)?));
    }
    Ok(attrs)
}

/// Load a PNG from `path` and scale it to [`ICON_SIZE`] square.
pub fn load_icon(path: &Path) -> Result<Icon> {
    let img = image::open(path)?
        .resize_exact(ICON_SIZE, ICON_SIZE, FilterType::Nearest)
        .to_rgba8();
    let (w, h) = img.dimensions();
    Icon::from_rgba(img.into_raw(), w, h).map_err(|e| Error::Window(e.to_string()))
}

/// Apply the presentation mode in `config` to `window`.
///
/// `Fullscreen` picks the current monitor's video mode closest in pixel area
/// to the physical size, and degrades to borderless when the monitor or its
/// mode list is unavailable.
pub fn apply_window_settings(window: &Window, config: &WindowConfig) {
    match config.mode {
        WindowMode::Windowed => {
            window.set_fullscreen(None);
            window.set_decorations(true);
            window.set_resizable(false);
            // A `None` return means the resize arrives later as an event.
            let _ = window.request_inner_size(PhysicalSize::new(
                config.physical_width,
                config.physical_height,
            ));
        }

        WindowMode::Fullscreen => {
            let target_area = config.physical_width as u64 * config.physical_height as u64;
            let fullscreen = match window.current_monitor() {
                Some(monitor) => monitor
                    .video_modes()
                    .min_by_key(|vm| {
                        let s = vm.size();
                        (s.width as u64 * s.height as u64).abs_diff(target_area)
                    })
                    .map(Fullscreen::Exclusive)
                    .unwrap_or_else(|| Fullscreen::Borderless(Some(monitor.clone()))),
                None => Fullscreen::Borderless(None),
            };
            window.set_fullscreen(Some(fullscreen));
        }

        WindowMode::Borderless => {
            window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        }
    }
}
