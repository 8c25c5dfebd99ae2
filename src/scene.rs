use std::collections::HashSet;
use std::fmt;

use crate::input::KeyCode;
use crate::memory::Memory;
use crate::renderer::Surface;

/// What the loop should do with a scene once its frame has finished.
///
/// Replaces the "scene points at itself / at the next scene / at nothing"
/// convention with an explicit value.
#[derive(Default)]
pub enum Transition {
    /// Keep running this scene.
    #[default]
    Continue,
    /// Hand control to another scene; the current one is dropped.
    To(Box<dyn Scene>),
    /// Stop the program loop.
    Terminate,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "Continue"),
            Self::To(next) => write!(f, "To(level {})", next.level_id()),
            Self::Terminate => write!(f, "Terminate"),
        }
    }
}

/// Bookkeeping every scene carries. Embed one in each scene type and return
/// it from [`Scene::state`] / [`Scene::state_mut`].
#[derive(Debug)]
pub struct SceneState {
    pub transition: Transition,
    /// Cleared when the scene (or the window) asks the game to stop.
    pub keep_running: bool,
    /// Game-defined id; `0` is the main menu, `-1` means unset.
    pub level_id: i32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            transition: Transition::Continue,
            keep_running: true,
            level_id: -1,
        }
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(level_id: i32) -> Self {
        Self { level_id, ..Self::default() }
    }
}

/// One screen of the game (menu, level, credits...).
///
/// Per tick the loop calls `input`, `update` and `render` in that order, then
/// takes [`Scene::next`]. A transition requested during any of the three
/// callbacks therefore only takes effect after `render` has run.
pub trait Scene {
    /// React to this tick's input: `pressed` holds edge-triggered presses in
    /// order, `held` the keys currently down.
    fn input(&mut self, _memory: &mut Memory, _pressed: &[KeyCode], _held: &HashSet<KeyCode>) {}

    /// Advance state that does not come straight from input (timers,
    /// bounds checks, win conditions).
    fn update(&mut self, _memory: &mut Memory) {}

    /// Draw the current state. Shared state is read-only here.
    fn render(&mut self, _memory: &Memory, _surface: &mut Surface) {}

    fn state(&self) -> &SceneState;
    fn state_mut(&mut self) -> &mut SceneState;

    /// Request a switch to `next` at the end of this tick. The last request
    /// of a tick wins.
    fn change_scene(&mut self, next: Box<dyn Scene>) {
        self.state_mut().transition = Transition::To(next);
    }

    /// Request the loop to stop at the end of this tick.
    fn close_game(&mut self) {
        self.state_mut().transition = Transition::Terminate;
    }

    /// Ask for a clean shutdown on the next tick, without running another
    /// frame of this scene.
    fn stop(&mut self) {
        self.state_mut().keep_running = false;
    }

    fn is_finished(&self) -> bool {
        !self.state().keep_running
    }

    fn level_id(&self) -> i32 {
        self.state().level_id
    }

    /// Take the pending transition, leaving [`Transition::Continue`].
    fn next(&mut self) -> Transition {
        std::mem::take(&mut self.state_mut().transition)
    }
}
