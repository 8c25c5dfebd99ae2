use std::path::PathBuf;

/// Result alias carrying the crate-wide [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the scaffold can report to its caller.
///
/// Music errors (`TrackRange`, `TrackIndex`, `TrackLoad`, `Playback`) are
/// recoverable: the game keeps running without music. Platform errors are
/// fatal and surface from [`crate::engine::Program::run`] before any frame runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("audio device unavailable: {0}")]
    AudioUnavailable(String),

    /// `switch_random` needs a menu track, a credits track and at least two
    /// tracks in between.
    #[error("cannot pick a random track from {len} tracks (need at least 4)")]
    TrackRange { len: usize },

    #[error("track index {index} out of range ({len} tracks)")]
    TrackIndex { index: usize, len: usize },

    #[error("failed to load track {}: {reason}", path.display())]
    TrackLoad { path: PathBuf, reason: String },

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("window setup failed: {0}")]
    Window(String),

    #[error("gpu setup failed: {0}")]
    Gpu(String),

    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
