// Demo game: a menu, a play field and a credits screen wired through the
// scene loop. Start with `cargo run -- 1280 720 --config game.json`.
use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use scenebase::config::GameConfig;
use scenebase::ui::TextLabel;
use scenebase::renderer::Surface;
use scenebase::{Color, KeyCode, Memory, Program, Rect, Scene, SceneState};

/// Resolution the demo's labels are laid out at.
const DESIGN_SIZE: (f32, f32) = (1280.0, 720.0);

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the scenebase demo scenes", long_about = None)]
struct Cli {
    /// Window width in pixels (default 1280).
    width: Option<u32>,
    /// Window height in pixels (default 720).
    height: Option<u32>,
    /// PNG to use as the window icon.
    #[arg(long)]
    icon: Option<PathBuf>,
    /// JSON game config; command line values override it.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    scenebase::logger::init()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(w) = cli.width {
        config.window.physical_width = w;
        config.window.logical_width = w;
    }
    if let Some(h) = cli.height {
        config.window.physical_height = h;
        config.window.logical_height = h;
    }
    if cli.icon.is_some() {
        config.window.icon = cli.icon;
    }

    let mut program = Program::new(config);
    program.memory_mut().load_game()?;
    program.memory_mut().load_scenes()?;
    program.run(Box::new(MenuScene::new()))?;
    Ok(())
}

/// Label laid out at [`DESIGN_SIZE`] and scaled to the current resolution.
fn label(memory: &Memory, text: &str, x: f32, y: f32, size: u32, color: Color) -> TextLabel {
    let mut label = TextLabel::new(text, Vec2::new(x, y), size, "impact", color, None, memory.fonts.as_ref());
    label.rescale(
        memory.width as f32 / DESIGN_SIZE.0,
        memory.height as f32 / DESIGN_SIZE.1,
        memory.fonts.as_ref(),
    );
    label
}

// ── Menu ────────────────────────────────────────────────────────────────────

struct MenuScene {
    state: SceneState,
    labels: Vec<TextLabel>,
}

impl MenuScene {
    fn new() -> Self {
        Self { state: SceneState::with_level(0), labels: Vec::new() }
    }
}

impl Scene for MenuScene {
    fn input(&mut self, _memory: &mut Memory, pressed: &[KeyCode], _held: &HashSet<KeyCode>) {
        for key in pressed {
            match key {
                KeyCode::Enter => self.change_scene(Box::new(PlayScene::new())),
                KeyCode::Escape => self.close_game(),
                _ => {}
            }
        }
    }

    fn update(&mut self, memory: &mut Memory) {
        if !self.labels.is_empty() {
            return;
        }
        self.labels = vec![
            label(memory, "SCENEBASE", 640.0, 260.0, 64, Color::YELLOW),
            label(memory, "ENTER to play   ESC to quit", 640.0, 380.0, 24, Color::WHITE),
        ];
        if let Some(music) = memory.music.as_mut() {
            if let Err(e) = music.set_track(0, 1.0, -1, 0.0, 0) {
                tracing::warn!("menu theme unavailable: {e}");
            }
        }
    }

    fn render(&mut self, _memory: &Memory, surface: &mut Surface) {
        surface.clear(Color::DARK_GREY);
        for l in &self.labels {
            l.draw(surface);
        }
    }

    fn state(&self) -> &SceneState { &self.state }
    fn state_mut(&mut self) -> &mut SceneState { &mut self.state }
}

// ── Play ────────────────────────────────────────────────────────────────────

struct PlayScene {
    state: SceneState,
    player: Vec2,
    started: bool,
    hint: Option<TextLabel>,
}

impl PlayScene {
    const SPEED: f32 = 4.0;
    const SIZE: u32 = 24;

    fn new() -> Self {
        Self {
            state: SceneState::with_level(1),
            player: Vec2::new(DESIGN_SIZE.0 / 2.0, DESIGN_SIZE.1 / 2.0),
            started: false,
            hint: None,
        }
    }
}

impl Scene for PlayScene {
    fn input(&mut self, _memory: &mut Memory, pressed: &[KeyCode], held: &HashSet<KeyCode>) {
        if pressed.contains(&KeyCode::Escape) {
            self.change_scene(Box::new(MenuScene::new()));
        } else if pressed.contains(&KeyCode::KeyC) {
            self.change_scene(Box::new(CreditsScene::new()));
        }

        let mut delta = Vec2::ZERO;
        if held.contains(&KeyCode::ArrowUp) { delta.y -= 1.0; }
        if held.contains(&KeyCode::ArrowDown) { delta.y += 1.0; }
        if held.contains(&KeyCode::ArrowLeft) { delta.x -= 1.0; }
        if held.contains(&KeyCode::ArrowRight) { delta.x += 1.0; }
        self.player += delta * Self::SPEED;
    }

    fn update(&mut self, memory: &mut Memory) {
        let half = Self::SIZE as f32 / 2.0;
        self.player = self.player.clamp(
            Vec2::splat(half),
            Vec2::new(memory.width as f32 - half, memory.height as f32 - half),
        );

        if !self.started {
            self.started = true;
            self.hint = Some(label(memory, "ARROWS move   C credits   ESC menu", 640.0, 40.0, 20, Color::GREY));
            if let Some(music) = memory.music.as_mut() {
                if let Err(e) = music.switch_random() {
                    tracing::warn!("no level music: {e}");
                }
            }
        }
    }

    fn render(&mut self, memory: &Memory, surface: &mut Surface) {
        surface.clear(Color::BLACK);
        let (x, y) = (self.player.x as i32, self.player.y as i32);
        surface.fill_rect(Rect::centered_on(x, y, Self::SIZE, Self::SIZE), Color::CYAN);
        if let Some(hint) = &self.hint {
            hint.draw(surface);
        }
        if let Some(music) = memory.music.as_ref() {
            music.render_label(surface);
        }
    }

    fn state(&self) -> &SceneState { &self.state }
    fn state_mut(&mut self) -> &mut SceneState { &mut self.state }
}

// ── Credits ─────────────────────────────────────────────────────────────────

struct CreditsScene {
    state: SceneState,
    text: Option<TextLabel>,
}

impl CreditsScene {
    fn new() -> Self {
        Self { state: SceneState::with_level(2), text: None }
    }
}

impl Scene for CreditsScene {
    fn input(&mut self, _memory: &mut Memory, pressed: &[KeyCode], _held: &HashSet<KeyCode>) {
        if !pressed.is_empty() {
            self.stop();
        }
    }

    fn update(&mut self, memory: &mut Memory) {
        if self.text.is_some() {
            return;
        }
        self.text = Some(label(memory, "THANKS FOR PLAYING\npress any key", 640.0, 360.0, 32, Color::LIME_GREEN));
        if let Some(music) = memory.music.as_mut() {
            let last = music.tracks().len().saturating_sub(1);
            if let Err(e) = music.set_track(last, 0.5, 0, 0.0, 2000) {
                tracing::warn!("credits track unavailable: {e}");
            }
        }
    }

    fn render(&mut self, _memory: &Memory, surface: &mut Surface) {
        surface.clear(Color::DARK_GREEN);
        if let Some(text) = &self.text {
            text.draw(surface);
        }
    }

    fn state(&self) -> &SceneState { &self.state }
    fn state_mut(&mut self) -> &mut SceneState { &mut self.state }
}
