use std::rc::Rc;

use crate::audio::TrackPlayer;
use crate::config::GameConfig;
use crate::error::Result;
use crate::renderer::FontBook;

/// State shared by every scene for the life of the program.
///
/// Owned by [`crate::engine::Program`] and lent to scenes on each callback;
/// there is no global instance.
pub struct Memory {
    /// Logical resolution scenes draw at.
    pub width: u32,
    pub height: u32,
    /// `None` when the game runs without music.
    pub music: Option<TrackPlayer>,
    pub fonts: Rc<FontBook>,
    pub config: GameConfig,
}

impl Memory {
    pub fn new(config: GameConfig) -> Self {
        Self {
            width: config.window.logical_width,
            height: config.window.logical_height,
            music: None,
            fonts: Rc::new(FontBook::new()),
            config,
        }
    }

    pub fn attach_music(&mut self, player: TrackPlayer) {
        self.music = Some(player);
    }

    pub fn set_fonts(&mut self, fonts: FontBook) {
        self.fonts = Rc::new(fonts);
    }

    /// Stop the music, if any is attached.
    pub fn stop_music(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.stop();
        }
    }

    /// Restore a previous session. No save format exists yet; games that
    /// need one replace this.
    pub fn load_game(&mut self) -> Result<()> {
        tracing::debug!("load_game: nothing to restore");
        Ok(())
    }

    /// Load scene definitions. Same status as [`Memory::load_game`].
    pub fn load_scenes(&mut self) -> Result<()> {
        tracing::debug!("load_scenes: nothing to load");
        Ok(())
    }
}
