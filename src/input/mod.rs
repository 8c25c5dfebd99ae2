use std::collections::HashSet;

pub use winit::keyboard::KeyCode;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::PhysicalKey;

/// Input collected for one tick.
///
/// - `keys_pressed`: edge-triggered presses in arrival order, one entry per
///   physical press (OS key repeat is ignored).
/// - `keys_held`: keys currently down.
/// - `quit_requested`: the window was asked to close.
///
/// The loop calls [`InputState::clear_frame_state`] after every tick; held
/// keys survive it, presses and the quit flag do not.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub keys_pressed: Vec<KeyCode>,
    pub keys_held: HashSet<KeyCode>,
    pub quit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_frame_state(&mut self) {
        self.keys_pressed.clear();
        self.quit_requested = false;
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }

    /// Record a key going down. Only the first press of a held key counts.
    pub fn press(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
    }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Fold a winit window event into this frame's state. Events that are
    /// not input are ignored.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.request_quit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => self.press(*code),
                ElementState::Released => self.release(*code),
            },
            // Focus loss swallows key-up events; drop held keys so nothing sticks.
            WindowEvent::Focused(false) => self.keys_held.clear(),
            _ => {}
        }
    }
}
