pub mod tracks;

use std::path::{Path, PathBuf};
use std::time::Duration;

use kira::{
    Volume,
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::{
        PlaybackPosition, PlaybackState,
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    },
    tween::Tween,
};

pub use tracks::{TrackPlayer, list_tracks};

use crate::error::{Error, Result};

/// How many times a track repeats after its first play.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Loops {
    Forever,
    Times(u32),
}

impl Loops {
    /// `-1` (or any negative count) loops forever, `0` plays once,
    /// `n` plays `n` extra times.
    pub fn from_count(count: i32) -> Self {
        if count < 0 { Self::Forever } else { Self::Times(count as u32) }
    }
}

/// Playback backend driven by [`TrackPlayer`].
///
/// One track is loaded at a time; `load` replaces it and `play` starts it.
pub trait AudioDevice {
    /// Replace the loaded track. On failure the previous track keeps playing.
    fn load(&mut self, path: &Path) -> Result<()>;
    /// `start` is an offset into the track in seconds.
    fn play(&mut self, loops: Loops, start: f64, fade_in: Duration) -> Result<()>;
    fn stop(&mut self);
    /// `volume` is an amplitude in `0..=1`.
    fn set_volume(&mut self, volume: f32);
    /// True once per finished track. Finite loop counts are replayed here
    /// and only report finished after the last repeat.
    fn poll_finished(&mut self) -> bool;
}

/// Device that accepts every call and never plays anything.
#[derive(Debug, Default)]
pub struct NullDevice;

impl AudioDevice for NullDevice {
    fn load(&mut self, _path: &Path) -> Result<()> { Ok(()) }
    fn play(&mut self, _loops: Loops, _start: f64, _fade_in: Duration) -> Result<()> { Ok(()) }
    fn stop(&mut self) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn poll_finished(&mut self) -> bool { false }
}

/// [`AudioDevice`] on top of kira's default (cpal) backend.
pub struct KiraDevice {
    manager: AudioManager,
    loaded: Option<(PathBuf, StaticSoundData)>,
    handle: Option<StaticSoundHandle>,
    volume: f32,
    remaining_loops: u32,
}

impl KiraDevice {
    /// Open the default output device. Failure is fatal for a game that
    /// wants music, so it is reported instead of silently disabling audio.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| Error::AudioUnavailable(e.to_string()))?;
        Ok(Self {
            manager,
            loaded: None,
            handle: None,
            volume: 1.0,
            remaining_loops: 0,
        })
    }

    fn start(&mut self, settings: StaticSoundSettings) -> Result<()> {
        let Some((path, data)) = &self.loaded else {
            return Err(Error::Playback("no track loaded".into()));
        };
        match self.manager.play(data.clone().with_settings(settings)) {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => Err(Error::Playback(format!("{}: {e}", path.display()))),
        }
    }
}

impl AudioDevice for KiraDevice {
    fn load(&mut self, path: &Path) -> Result<()> {
        // A file that fails to decode leaves the current track playing.
        let data = StaticSoundData::from_file(path).map_err(|e| Error::TrackLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        self.stop();
        self.loaded = Some((path.to_path_buf(), data));
        Ok(())
    }

    fn play(&mut self, loops: Loops, start: f64, fade_in: Duration) -> Result<()> {
        let mut settings = StaticSoundSettings::new();
        settings.start_position = PlaybackPosition::Seconds(start.max(0.0)).into();
        settings.volume = Volume::Amplitude(self.volume as f64).into();
        if !fade_in.is_zero() {
            settings.fade_in_tween = Some(Tween {
                duration: fade_in,
                ..Default::default()
            });
        }
        self.remaining_loops = match loops {
            Loops::Forever => {
                settings = settings.loop_region(0.0..);
                0
            }
            Loops::Times(n) => n,
        };
        self.start(settings)
    }

    fn stop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            let _ = handle.stop(Tween::default());
        }
        self.remaining_loops = 0;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = self.handle.as_mut() {
            let _ = handle.set_volume(Volume::Amplitude(self.volume as f64), Tween::default());
        }
    }

    fn poll_finished(&mut self) -> bool {
        let stopped = self
            .handle
            .as_ref()
            .is_some_and(|h| h.state() == PlaybackState::Stopped);
        if !stopped {
            return false;
        }
        self.handle = None;
        if self.remaining_loops > 0 {
            self.remaining_loops -= 1;
            let mut settings = StaticSoundSettings::new();
            settings.volume = Volume::Amplitude(self.volume as f64).into();
            if let Err(e) = self.start(settings) {
                tracing::warn!("replaying track failed: {e}");
                return true;
            }
            return false;
        }
        true
    }
}
