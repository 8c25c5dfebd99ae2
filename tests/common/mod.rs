#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use image::{Rgba, RgbaImage};

use scenebase::audio::{AudioDevice, Loops};
use scenebase::{Color, Error, Result};
use scenebase::renderer::TextRasterizer;

// ── RecordingDevice ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(PathBuf),
    Play(Loops, f64, Duration),
    Stop,
    Volume(f32),
}

/// Audio device that records every call. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingDevice {
    pub calls: Rc<RefCell<Vec<Call>>>,
    /// Reported (once) by the next `poll_finished`.
    pub finished: Rc<Cell<bool>>,
    /// Number of `poll_finished` calls.
    pub polls: Rc<Cell<usize>>,
    /// While set, `load` fails with `Error::TrackLoad` and records nothing.
    pub fail_loads: Rc<Cell<bool>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn stopped(&self) -> bool {
        self.calls.borrow().contains(&Call::Stop)
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Load(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Call::Volume(v) => Some(*v),
            _ => None,
        })
    }
}

impl AudioDevice for RecordingDevice {
    fn load(&mut self, path: &Path) -> Result<()> {
        if self.fail_loads.get() {
            return Err(Error::TrackLoad {
                path: path.to_path_buf(),
                reason: "unreadable".into(),
            });
        }
        self.calls.borrow_mut().push(Call::Load(path.to_path_buf()));
        Ok(())
    }

    fn play(&mut self, loops: Loops, start: f64, fade_in: Duration) -> Result<()> {
        self.calls.borrow_mut().push(Call::Play(loops, start, fade_in));
        Ok(())
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(Call::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        self.calls.borrow_mut().push(Call::Volume(volume));
    }

    fn poll_finished(&mut self) -> bool {
        self.polls.set(self.polls.get() + 1);
        self.finished.replace(false)
    }
}

// ── BoxFonts ──────────────────────────────────────────────────────────────────

/// Rasterizer producing a solid box: half the size wide per character,
/// `size` tall. Counts how often it was asked to render.
#[derive(Default)]
pub struct BoxFonts {
    pub renders: Cell<usize>,
}

impl BoxFonts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextRasterizer for BoxFonts {
    fn render(&self, text: &str, color: Color, _family: &str, size: u32) -> RgbaImage {
        self.renders.set(self.renders.get() + 1);
        let w = (text.chars().count() as u32 * size / 2).max(1);
        let h = size.max(1);
        let px: Rgba<u8> = color.to_rgba8();
        RgbaImage::from_pixel(w, h, px)
    }
}

pub fn track_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("track{i:02}.ogg")).collect()
}

/// Fresh empty directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scenebase-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
