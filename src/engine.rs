use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::audio::{KiraDevice, TrackPlayer};
use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::input::InputState;
use crate::memory::Memory;
use crate::renderer::{FontBook, Renderer, Surface};
use crate::scene::{Scene, Transition};
use crate::window::{WindowConfig, apply_window_settings, window_attributes};

// ── FrameClock ──────────────────────────────────────────────────────────────

/// Fixed-rate tick deadlines.
///
/// Ticks are scheduled one period apart. A loop that falls a full period
/// behind resyncs to `now + period` instead of running a burst of catch-up
/// ticks.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    /// `rate` ticks per second; `0` is treated as 1. The first tick is due at
    /// `now`.
    pub fn new(rate: u32, now: Instant) -> Self {
        Self {
            period: Duration::from_secs(1) / rate.max(1),
            next: now,
        }
    }

    pub fn period(&self) -> Duration { self.period }
    pub fn deadline(&self) -> Instant { self.next }
    pub fn is_due(&self, now: Instant) -> bool { now >= self.next }

    /// Schedule the tick after the one that just ran at `now`.
    pub fn advance(&mut self, now: Instant) {
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
    }
}

// ── Program ─────────────────────────────────────────────────────────────────

/// Runs the active scene once per tick and carries out scene transitions.
///
/// [`Program::step`] is one tick and has no platform dependencies;
/// [`Program::run`] drives it from a window at the configured tick rate.
pub struct Program {
    memory: Memory,
    scene: Option<Box<dyn Scene>>,
    running: bool,
    iterations: u64,
    frames: u64,
}

impl Program {
    /// Build shared state from `config`. Fonts are loaded from
    /// `config.fonts_folder` when set; a broken font folder is logged and
    /// text falls back to placeholder boxes.
    pub fn new(config: GameConfig) -> Self {
        let fonts_folder = config.fonts_folder.clone();
        let mut memory = Memory::new(config);
        if let Some(folder) = fonts_folder {
            match FontBook::load_folder(&folder) {
                Ok(fonts) => memory.set_fonts(fonts),
                Err(e) => tracing::warn!(folder = %folder.display(), "fonts unavailable: {e}"),
            }
        }
        Self {
            memory,
            scene: None,
            running: false,
            iterations: 0,
            frames: 0,
        }
    }

    /// Attach an already built music player instead of opening the audio
    /// device in [`Program::run`].
    pub fn with_music(mut self, player: TrackPlayer) -> Self {
        self.memory.attach_music(player);
        self
    }

    pub fn memory(&self) -> &Memory { &self.memory }
    pub fn memory_mut(&mut self) -> &mut Memory { &mut self.memory }

    /// Iterations run so far, teardown included.
    pub fn iterations(&self) -> u64 { self.iterations }
    /// Iterations that ran a scene's input/update/render.
    pub fn frames(&self) -> u64 { self.frames }

    pub fn active_scene(&self) -> Option<&dyn Scene> {
        self.scene.as_deref()
    }

    pub fn is_running(&self) -> bool {
        self.running && self.scene.is_some()
    }

    /// Make `initial` the active scene and arm the loop.
    pub fn start(&mut self, initial: Box<dyn Scene>) {
        tracing::debug!(level = initial.level_id(), "starting scene");
        self.scene = Some(initial);
        self.running = true;
    }

    /// Open the audio device and attach a [`TrackPlayer`] for the configured
    /// music folder. Does nothing without a music config or when music is
    /// already attached.
    ///
    /// An unavailable audio device is an error. A missing track folder only
    /// disables music.
    pub fn init_music(&mut self) -> Result<()> {
        if self.memory.music.is_some() {
            return Ok(());
        }
        let Some(music) = self.memory.config.music.clone() else {
            return Ok(());
        };

        let device = KiraDevice::new()?;
        match TrackPlayer::new(
            Box::new(device),
            &music.folder,
            music.volume_percent,
            self.memory.width,
            self.memory.height,
            self.memory.fonts.clone(),
        ) {
            Ok(player) => self.memory.attach_music(player),
            Err(e) => tracing::warn!("running without music: {e}"),
        }
        Ok(())
    }

    /// Run one tick against `input`, drawing into `surface`.
    ///
    /// A quit request stops the music and the scene, then falls through to
    /// teardown in the same tick. Teardown (loop stopped or scene finished)
    /// stops the music and closes the scene without calling it. Otherwise
    /// the scene gets `input`, `update` and `render`, and its pending
    /// transition is applied.
    ///
    /// Returns whether another tick should run.
    pub fn step(&mut self, input: &InputState, surface: &mut Surface) -> bool {
        self.step_at(input, surface, Instant::now())
    }

    /// [`Program::step`] with an explicit tick time for the music upkeep.
    pub fn step_at(&mut self, input: &InputState, surface: &mut Surface, now: Instant) -> bool {
        let Some(mut scene) = self.scene.take() else {
            self.running = false;
            return false;
        };

        if input.quit_requested {
            tracing::info!("quit requested");
            self.memory.stop_music();
            scene.stop();
            self.running = false;
        }

        if !self.running || scene.is_finished() {
            self.running = false;
            self.memory.stop_music();
            scene.close_game();
            tracing::debug!(level = scene.level_id(), "scene closed");
        } else {
            scene.input(&mut self.memory, &input.keys_pressed, &input.keys_held);
            scene.update(&mut self.memory);
            scene.render(&self.memory, surface);
            self.frames += 1;

            self.scene = match scene.next() {
                Transition::Continue => Some(scene),
                Transition::To(next) => {
                    tracing::debug!(from = scene.level_id(), to = next.level_id(), "scene change");
                    Some(next)
                }
                Transition::Terminate => {
                    tracing::info!(level = scene.level_id(), "scene closed the game");
                    self.memory.stop_music();
                    self.running = false;
                    None
                }
            };
            self.tick_music(now);
        }

        self.iterations += 1;
        self.is_running()
    }

    /// Per-tick music upkeep for the active scene: one fade step outside the
    /// menu, and a new random track when the last one ended.
    ///
    /// The device is polled every tick, shuffling or not; finite loop counts
    /// are replayed from that poll.
    fn tick_music(&mut self, now: Instant) {
        let Some(level) = self.scene.as_ref().map(|s| s.level_id()) else {
            return;
        };
        let fade = self.memory.config.fade_music && level != 0;
        let shuffle = self.memory.config.shuffle_on_track_end;
        let Some(music) = self.memory.music.as_mut() else {
            return;
        };

        if fade {
            music.fade_toward_max_at(now);
        }
        let finished = music.track_finished();
        if shuffle && finished {
            if let Err(e) = music.switch_random() {
                tracing::warn!("could not switch track: {e}");
            }
        }
    }

    /// Open the window and run until no scene is left or the window closes.
    ///
    /// Music is set up first, so an unavailable audio device is reported
    /// before any tick runs.
    pub fn run(mut self, initial: Box<dyn Scene>) -> Result<()> {
        self.init_music()?;
        self.start(initial);

        let window = self.memory.config.window.clone();
        let tick_rate = self.memory.config.tick_rate;
        let event_loop = EventLoop::new()?;
        let mut app = App {
            surface: Surface::new(window.logical_width, window.logical_height),
            window,
            program: self,
            renderer: None,
            input: InputState::new(),
            clock: FrameClock::new(tick_rate, Instant::now()),
            error: None,
        };
        tracing::info!(tick_rate, "entering main loop");
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Run `initial` in a `width × height` window with default settings.
pub fn run(width: u32, height: u32, initial: Box<dyn Scene>) -> Result<()> {
    Program::new(GameConfig::with_size(width, height)).run(initial)
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    window: WindowConfig,
    program: Program,
    renderer: Option<Renderer>,
    surface: Surface,
    input: InputState,
    clock: FrameClock,
    /// Setup failure to hand back from `Program::run` once the loop exits.
    error: Option<Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        tracing::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_renderer(&self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let attrs = match window_attributes(&self.window) {
            Ok(attrs) => attrs,
            Err(e) => {
                tracing::warn!("window icon not used: {e}");
                window_attributes(&WindowConfig { icon: None, ..self.window.clone() })?
            }
        };
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| Error::Window(e.to_string()))?,
        );
        apply_window_settings(&window, &self.window);
        pollster::block_on(Renderer::new(
            window,
            self.window.logical_width,
            self.window.logical_height,
        ))
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if !self.clock.is_due(now) {
            return;
        }
        self.clock.advance(now);

        let keep_going = self.program.step(&self.input, &mut self.surface);
        self.input.clear_frame_state();

        if let Some(renderer) = self.renderer.as_mut() {
            match renderer.present(&self.surface) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = renderer.window.inner_size();
                    renderer.resize(size);
                }
                Err(e) => tracing::warn!("present failed: {e}"),
            }
        }

        if !keep_going {
            tracing::info!(
                iterations = self.program.iterations(),
                frames = self.program.frames(),
                "main loop finished"
            );
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.deadline()));
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            if self.clock.is_due(Instant::now()) {
                renderer.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.deadline()));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_window_event(&event);

        match event {
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.tick(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_ticks_at_fixed_period() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(120, t0);
        assert!(clock.is_due(t0));
        clock.advance(t0);
        assert_eq!(clock.deadline(), t0 + clock.period());
        assert!(!clock.is_due(t0 + Duration::from_millis(1)));
    }

    #[test]
    fn clock_period_for_120hz() {
        let clock = FrameClock::new(120, Instant::now());
        assert_eq!(clock.period(), Duration::from_nanos(8_333_333));
    }

    #[test]
    fn clock_resyncs_when_far_behind() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(100, t0);
        let late = t0 + Duration::from_millis(500);
        clock.advance(late);
        assert_eq!(clock.deadline(), late + Duration::from_millis(10));
    }

    #[test]
    fn clock_keeps_schedule_when_slightly_late() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new(100, t0);
        clock.advance(t0);
        clock.advance(t0 + Duration::from_millis(12));
        assert_eq!(clock.deadline(), t0 + Duration::from_millis(20));
    }

    #[test]
    fn zero_rate_is_one_hz() {
        let clock = FrameClock::new(0, Instant::now());
        assert_eq!(clock.period(), Duration::from_secs(1));
    }
}
