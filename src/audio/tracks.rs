use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use glam::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{AudioDevice, Loops};
use crate::error::{Error, Result};
use crate::geometry::Color;
use crate::renderer::{Surface, TextRasterizer};
use crate::ui::TextLabel;

/// Share of the player's volume that music ramps up to.
pub const MAX_VOLUME_FACTOR: f32 = 0.7;
/// Volume added per fade step.
pub const FADE_STEP: f32 = 0.01;
/// Minimum time between two fade steps.
pub const FADE_INTERVAL: Duration = Duration::from_millis(75);
/// How long the "now playing" label stays on screen after a track change.
pub const LABEL_DISPLAY: Duration = Duration::from_secs(3);

const LABEL_SIZE: u32 = 20;
const LABEL_FAMILY: &str = "impact";

/// List the tracks in `folder`: regular files directly inside it, sorted by
/// file name. The position in the returned list is the track index.
///
/// Names that are not valid UTF-8 are skipped with a warning.
pub fn list_tracks(folder: impl AsRef<Path>) -> Result<Vec<String>> {
    let folder = folder.as_ref();
    if !folder.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("track folder {} not found", folder.display()),
        )
        .into());
    }

    let mut tracks = Vec::new();
    for entry in walkdir::WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        match entry.file_name().to_str() {
            Some(name) => tracks.push(name.to_owned()),
            None => tracing::warn!(path = %entry.path().display(), "skipping track with non UTF-8 name"),
        }
    }
    Ok(tracks)
}

/// Music manager: which track plays, how loud, and the "now playing" label.
///
/// Index 0 is reserved for the menu theme and the last index for the credits
/// track; [`TrackPlayer::switch_random`] never picks either.
pub struct TrackPlayer {
    tracks: Vec<String>,
    folder: PathBuf,
    current_index: usize,
    volume_percent: u8,
    current_volume: f32,
    max_volume: f32,
    last_volume_update: Instant,
    label: Option<TextLabel>,
    label_shown_at: Instant,
    screen: (u32, u32),
    fonts: Rc<dyn TextRasterizer>,
    device: Box<dyn AudioDevice>,
    rng: StdRng,
}

impl TrackPlayer {
    /// Enumerate `folder` and set up the player for a `width × height` screen.
    pub fn new(
        device: Box<dyn AudioDevice>,
        folder: impl Into<PathBuf>,
        volume_percent: u8,
        width: u32,
        height: u32,
        fonts: Rc<dyn TextRasterizer>,
    ) -> Result<Self> {
        let folder = folder.into();
        let tracks = list_tracks(&folder)?;
        tracing::info!(folder = %folder.display(), count = tracks.len(), "found tracks");
        Ok(Self::from_tracks(device, folder, tracks, volume_percent, (width, height), fonts))
    }

    /// Build from an explicit track list; `folder` is only used to resolve
    /// track paths on load.
    pub fn from_tracks(
        mut device: Box<dyn AudioDevice>,
        folder: impl Into<PathBuf>,
        tracks: Vec<String>,
        volume_percent: u8,
        screen: (u32, u32),
        fonts: Rc<dyn TextRasterizer>,
    ) -> Self {
        let volume_percent = volume_percent.min(100);
        let max_volume = volume_percent as f32 / 100.0;
        device.set_volume(max_volume);

        let now = Instant::now();
        let mut player = Self {
            tracks,
            folder: folder.into(),
            current_index: 0,
            volume_percent,
            current_volume: 0.0,
            max_volume,
            last_volume_update: now,
            label: None,
            label_shown_at: now,
            screen,
            fonts,
            device,
            rng: StdRng::from_entropy(),
        };
        if !player.tracks.is_empty() {
            player.label = Some(player.make_label());
        }
        player
    }

    /// Replace the random source, for reproducible track picks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn tracks(&self) -> &[String] { &self.tracks }
    pub fn folder(&self) -> &Path { &self.folder }
    pub fn current_index(&self) -> usize { self.current_index }
    pub fn current_track(&self) -> Option<&str> {
        self.tracks.get(self.current_index).map(String::as_str)
    }
    pub fn volume_percent(&self) -> u8 { self.volume_percent }
    pub fn current_volume(&self) -> f32 { self.current_volume }
    pub fn max_volume(&self) -> f32 { self.max_volume }
    pub fn label(&self) -> Option<&TextLabel> { self.label.as_ref() }

    /// Change the player's volume setting (clamped to 100). A playing track
    /// louder than the new ceiling is turned down immediately.
    pub fn set_volume_percent(&mut self, percent: u8) {
        self.volume_percent = percent.min(100);
        self.max_volume = MAX_VOLUME_FACTOR * self.scale();
        if self.current_volume > self.max_volume {
            self.current_volume = self.max_volume;
            self.device.set_volume(self.current_volume);
        }
    }

    /// Play a random track once, from silence, skipping the menu and
    /// credits tracks.
    ///
    /// Needs at least 4 tracks; with fewer, returns [`Error::TrackRange`]
    /// and leaves the current index alone. A track that fails to load leaves
    /// index, volume and label unchanged.
    pub fn switch_random(&mut self) -> Result<usize> {
        let len = self.tracks.len();
        if len < 4 {
            return Err(Error::TrackRange { len });
        }

        let index = self.rng.gen_range(1..=len - 2);
        self.device.load(&self.track_path(index))?;

        self.current_index = index;
        self.current_volume = 0.0;
        self.refresh_label();
        self.device.set_volume(self.current_volume);
        self.device.play(Loops::Times(0), 0.0, Duration::ZERO)?;

        tracing::info!(index = self.current_index, track = %self.tracks[self.current_index], "switched track");
        Ok(self.current_index)
    }

    /// Play track `index` at `volume_fraction` of the player's volume.
    ///
    /// `loop_count`: `-1` forever, `0` once, `n` repeats. `start_offset` is in
    /// seconds, `fade_in_ms` in milliseconds. Nothing changes when the track
    /// fails to load.
    pub fn set_track(
        &mut self,
        index: usize,
        volume_fraction: f32,
        loop_count: i32,
        start_offset: f64,
        fade_in_ms: u64,
    ) -> Result<()> {
        let len = self.tracks.len();
        if index >= len {
            return Err(Error::TrackIndex { index, len });
        }

        self.device.load(&self.track_path(index))?;

        self.max_volume = MAX_VOLUME_FACTOR * self.scale();
        self.current_index = index;
        self.refresh_label();
        self.current_volume = volume_fraction * self.scale();
        self.device.set_volume(self.current_volume);
        self.device.play(
            Loops::from_count(loop_count),
            start_offset,
            Duration::from_millis(fade_in_ms),
        )?;

        tracing::info!(index, track = %self.tracks[index], volume = self.current_volume, "set track");
        Ok(())
    }

    /// One step of the fade-in; call once per tick. See [`Self::fade_toward_max_at`].
    pub fn fade_toward_max(&mut self) -> bool {
        self.fade_toward_max_at(Instant::now())
    }

    /// Raise the volume by [`FADE_STEP`] if it is below the ceiling and at
    /// least [`FADE_INTERVAL`] passed since the last step. Returns whether a
    /// step was taken. Never exceeds the ceiling.
    pub fn fade_toward_max_at(&mut self, now: Instant) -> bool {
        self.max_volume = MAX_VOLUME_FACTOR * self.scale();
        if self.current_volume >= self.max_volume
            || now.saturating_duration_since(self.last_volume_update) < FADE_INTERVAL
        {
            return false;
        }
        self.current_volume = (self.current_volume + FADE_STEP).min(self.max_volume);
        self.device.set_volume(self.current_volume);
        self.last_volume_update = now;
        true
    }

    pub fn stop(&mut self) {
        self.device.stop();
    }

    /// Whether the current track ended since the last call.
    pub fn track_finished(&mut self) -> bool {
        self.device.poll_finished()
    }

    pub fn label_visible(&self, now: Instant) -> bool {
        self.label.is_some() && now.saturating_duration_since(self.label_shown_at) < LABEL_DISPLAY
    }

    /// Draw the "now playing" label while it is still due on screen.
    pub fn render_label(&self, surface: &mut Surface) {
        if self.label_visible(Instant::now()) {
            if let Some(label) = &self.label {
                label.draw(surface);
            }
        }
    }

    fn scale(&self) -> f32 {
        self.volume_percent as f32 / 100.0
    }

    fn track_path(&self, index: usize) -> PathBuf {
        self.folder.join(&self.tracks[index])
    }

    fn refresh_label(&mut self) {
        self.label = Some(self.make_label());
        self.label_shown_at = Instant::now();
    }

    fn make_label(&self) -> TextLabel {
        let (w, h) = (self.screen.0 as f32, self.screen.1 as f32);
        TextLabel::new(
            format!("PLAYING: {}", self.tracks[self.current_index]),
            Vec2::new(w / 2.0, h - h / 10.0),
            LABEL_SIZE,
            LABEL_FAMILY,
            Color::WHITE,
            None,
            self.fonts.as_ref(),
        )
    }
}
