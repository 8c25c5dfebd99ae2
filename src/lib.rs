pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logger;
pub mod memory;
pub mod renderer;
pub mod scene;
pub mod ui;
pub mod window;

pub use engine::{FrameClock, Program, run};
pub use error::{Error, Result};
pub use geometry::{Color, Rect};
pub use input::{InputState, KeyCode};
pub use memory::Memory;
pub use scene::{Scene, SceneState, Transition};
