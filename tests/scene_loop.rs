mod common;

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::{Duration, Instant};

use common::{BoxFonts, Call, RecordingDevice, track_names};
use scenebase::audio::tracks::FADE_INTERVAL;
use scenebase::audio::{Loops, NullDevice, TrackPlayer};
use scenebase::config::GameConfig;
use scenebase::renderer::Surface;
use scenebase::{InputState, KeyCode, Memory, Program, Scene, SceneState};

type Log = Rc<RefCell<Vec<String>>>;

enum Action {
    Change(Box<dyn Scene>),
    Close,
    Stop,
}

/// Scene that logs its callbacks and carries out the next batch of planned
/// actions on each input (and, separately, each update) call.
struct Scripted {
    state: SceneState,
    name: &'static str,
    log: Log,
    plan: VecDeque<Vec<Action>>,
    update_plan: VecDeque<Vec<Action>>,
}

impl Scripted {
    fn new(name: &'static str, level: i32, log: &Log) -> Self {
        Self {
            state: SceneState::with_level(level),
            name,
            log: log.clone(),
            plan: VecDeque::new(),
            update_plan: VecDeque::new(),
        }
    }

    fn then(mut self, actions: Vec<Action>) -> Self {
        self.plan.push_back(actions);
        self
    }

    fn then_in_update(mut self, actions: Vec<Action>) -> Self {
        self.update_plan.push_back(actions);
        self
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Change(next) => self.change_scene(next),
                Action::Close => self.close_game(),
                Action::Stop => self.stop(),
            }
        }
    }

    fn boxed(self) -> Box<dyn Scene> {
        Box::new(self)
    }
}

impl Scene for Scripted {
    fn input(&mut self, _memory: &mut Memory, pressed: &[KeyCode], _held: &HashSet<KeyCode>) {
        self.log.borrow_mut().push(format!("{}:input({})", self.name, pressed.len()));
        let actions = self.plan.pop_front().unwrap_or_default();
        self.apply(actions);
    }

    fn update(&mut self, _memory: &mut Memory) {
        self.log.borrow_mut().push(format!("{}:update", self.name));
        let actions = self.update_plan.pop_front().unwrap_or_default();
        self.apply(actions);
    }

    fn render(&mut self, _memory: &Memory, _surface: &mut Surface) {
        self.log.borrow_mut().push(format!("{}:render", self.name));
    }

    fn state(&self) -> &SceneState { &self.state }
    fn state_mut(&mut self) -> &mut SceneState { &mut self.state }
}

fn program() -> Program {
    Program::new(GameConfig::with_size(320, 240))
}

fn program_with_music(tracks: usize) -> (Program, RecordingDevice) {
    let device = RecordingDevice::new();
    let player = TrackPlayer::from_tracks(
        Box::new(device.clone()),
        "songs",
        track_names(tracks),
        100,
        (320, 240),
        Rc::new(BoxFonts::new()),
    )
    .with_seed(7);
    let program = program().with_music(player);
    device.clear();
    (program, device)
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

// ── Frame order ───────────────────────────────────────────────────────────────

#[test]
fn one_iteration_calls_input_update_render_once_in_order() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).boxed());

    assert!(program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert_eq!(program.frames(), 1);
    assert_eq!(program.iterations(), 1);
}

#[test]
fn pressed_keys_reach_the_scene() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).boxed());

    let mut input = InputState::new();
    input.press(KeyCode::Enter);
    input.press(KeyCode::Space);
    program.step(&input, &mut surface);
    assert_eq!(drain(&log)[0], "a:input(2)");
}

#[test]
fn step_without_scene_reports_done() {
    let mut program = program();
    let mut surface = Surface::new(8, 8);
    assert!(!program.step(&InputState::new(), &mut surface));
    assert!(!program.is_running());
}

// ── Transitions ───────────────────────────────────────────────────────────────

#[test]
fn change_scene_applies_after_render() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    let b = Scripted::new("b", 2, &log).boxed();
    program.start(Scripted::new("a", 1, &log).then(vec![Action::Change(b)]).boxed());

    assert!(program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert_eq!(program.active_scene().map(|s| s.level_id()), Some(2));

    program.step(&InputState::new(), &mut surface);
    assert_eq!(drain(&log), ["b:input(0)", "b:update", "b:render"]);
}

#[test]
fn last_change_request_of_a_frame_wins() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    let b = Scripted::new("b", 2, &log).boxed();
    let c = Scripted::new("c", 3, &log).boxed();
    program.start(
        Scripted::new("a", 1, &log)
            .then(vec![Action::Change(b), Action::Change(c)])
            .boxed(),
    );

    program.step(&InputState::new(), &mut surface);
    assert_eq!(program.active_scene().map(|s| s.level_id()), Some(3));
    drain(&log);
    program.step(&InputState::new(), &mut surface);
    assert_eq!(drain(&log)[0], "c:input(0)");
}

#[test]
fn change_scene_from_update_applies_after_render() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    let b = Scripted::new("b", 2, &log).boxed();
    program.start(Scripted::new("a", 1, &log).then_in_update(vec![Action::Change(b)]).boxed());

    assert!(program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert_eq!(program.active_scene().map(|s| s.level_id()), Some(2));
}

#[test]
fn update_overrides_change_requested_in_input() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    let b = Scripted::new("b", 2, &log).boxed();
    let c = Scripted::new("c", 3, &log).boxed();
    program.start(
        Scripted::new("a", 1, &log)
            .then(vec![Action::Change(b)])
            .then_in_update(vec![Action::Change(c)])
            .boxed(),
    );

    program.step(&InputState::new(), &mut surface);
    assert_eq!(program.active_scene().map(|s| s.level_id()), Some(3));
}

#[test]
fn scene_that_never_changes_keeps_running() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).boxed());

    for _ in 0..50 {
        assert!(program.step(&InputState::new(), &mut surface));
    }
    assert_eq!(program.frames(), 50);
    assert_eq!(program.active_scene().map(|s| s.level_id()), Some(1));
}

#[test]
fn chain_of_scenes_ends_with_a_teardown_iteration() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    let c = Scripted::new("c", 3, &log).then(vec![Action::Stop]).boxed();
    let b = Scripted::new("b", 2, &log).then(vec![Action::Change(c)]).boxed();
    program.start(
        Scripted::new("a", 1, &log)
            .then(vec![])
            .then(vec![Action::Change(b)])
            .boxed(),
    );

    let mut steps = 0;
    while program.step(&InputState::new(), &mut surface) {
        steps += 1;
        assert!(steps < 10, "loop did not terminate");
    }

    // a, a, b, c frames, then one teardown iteration.
    assert_eq!(program.frames(), 4);
    assert_eq!(program.iterations(), 5);
    let renders: Vec<String> = drain(&log).into_iter().filter(|l| l.ends_with("render")).collect();
    assert_eq!(renders, ["a:render", "a:render", "b:render", "c:render"]);
    assert!(program.active_scene().is_none());
}

// ── Termination ───────────────────────────────────────────────────────────────

#[test]
fn stopped_scene_gets_no_callbacks_and_loop_ends() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    let mut scene = Scripted::new("a", 1, &log);
    scene.stop();
    program.start(scene.boxed());

    assert!(!program.step(&InputState::new(), &mut surface));
    assert!(drain(&log).is_empty());
    assert_eq!(program.frames(), 0);
    assert_eq!(program.iterations(), 1);
    assert!(device.stopped());
    assert!(program.active_scene().is_none());
}

#[test]
fn stop_during_frame_finishes_the_frame_first() {
    let log = Log::default();
    let mut program = program();
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).then(vec![Action::Stop]).boxed());

    assert!(program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert!(!program.step(&InputState::new(), &mut surface));
    assert!(drain(&log).is_empty());
}

#[test]
fn quit_request_stops_music_without_running_the_scene() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).boxed());

    let mut input = InputState::new();
    input.request_quit();
    assert!(!program.step(&input, &mut surface));
    assert!(drain(&log).is_empty());
    assert!(device.stopped());
    assert!(!program.is_running());
}

#[test]
fn quit_request_wins_over_pending_scene_change() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    let mut scene = Scripted::new("a", 1, &log);
    scene.change_scene(Scripted::new("b", 2, &log).boxed());
    program.start(scene.boxed());

    let mut input = InputState::new();
    input.request_quit();
    assert!(!program.step(&input, &mut surface));
    assert!(drain(&log).is_empty());
    assert!(device.stopped());
    assert!(program.active_scene().is_none());
    assert_eq!(program.frames(), 0);
}

#[test]
fn quit_request_on_stopped_scene_still_ends_the_loop() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    let mut scene = Scripted::new("a", 1, &log);
    scene.stop();
    program.start(scene.boxed());

    let mut input = InputState::new();
    input.request_quit();
    assert!(!program.step(&input, &mut surface));
    assert!(drain(&log).is_empty());
    assert!(device.stopped());
    assert_eq!(program.iterations(), 1);
}

#[test]
fn close_game_from_update_ends_after_the_frame() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).then_in_update(vec![Action::Close]).boxed());

    assert!(!program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert!(device.stopped());
    assert!(program.active_scene().is_none());
}

#[test]
fn close_game_stops_music_and_ends_after_the_frame() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("a", 1, &log).then(vec![Action::Close]).boxed());

    assert!(!program.step(&InputState::new(), &mut surface));
    assert_eq!(drain(&log), ["a:input(0)", "a:update", "a:render"]);
    assert_eq!(program.frames(), 1);
    assert!(device.stopped());
    assert!(program.active_scene().is_none());
}

// ── Music upkeep ──────────────────────────────────────────────────────────────

#[test]
fn music_fades_in_outside_the_menu() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    program.memory_mut().config.fade_music = true;
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("level", 1, &log).boxed());

    let later = Instant::now() + FADE_INTERVAL * 2;
    program.step_at(&InputState::new(), &mut surface, later);
    assert_eq!(device.last_volume(), Some(0.01));

    // Same tick time again: too soon for a second step.
    program.step_at(&InputState::new(), &mut surface, later);
    assert_eq!(device.last_volume(), Some(0.01));
}

#[test]
fn music_does_not_fade_in_the_menu() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    program.memory_mut().config.fade_music = true;
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("menu", 0, &log).boxed());

    let later = Instant::now() + FADE_INTERVAL * 2;
    program.step_at(&InputState::new(), &mut surface, later);
    assert_eq!(device.last_volume(), None);
}

#[test]
fn device_is_polled_every_frame_without_shuffle() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    assert!(!program.memory().config.shuffle_on_track_end);
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("level", 1, &log).boxed());
    if let Some(music) = program.memory_mut().music.as_mut() {
        music.set_track(1, 1.0, 2, 0.0, 0).unwrap();
    }
    device.clear();

    for _ in 0..100 {
        program.step(&InputState::new(), &mut surface);
    }
    assert_eq!(device.polls.get(), 100);

    // A finished track is not replaced when shuffling is off.
    device.finished.set(true);
    program.step(&InputState::new(), &mut surface);
    assert!(device.loads().is_empty());
    assert_eq!(program.memory().music.as_ref().map(|m| m.current_index()), Some(1));
}

#[test]
fn finished_track_is_replaced_when_shuffling() {
    let log = Log::default();
    let (mut program, device) = program_with_music(5);
    program.memory_mut().config.shuffle_on_track_end = true;
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("level", 1, &log).boxed());

    device.finished.set(true);
    program.step(&InputState::new(), &mut surface);

    let loads = device.loads();
    assert_eq!(loads.len(), 1);
    let index = program.memory().music.as_ref().map(|m| m.current_index());
    assert!(matches!(index, Some(1..=3)));
    assert!(device.calls().contains(&Call::Play(Loops::Times(0), 0.0, Duration::ZERO)));
}

#[test]
fn headless_loop_runs_with_silent_device() {
    let log = Log::default();
    let player = TrackPlayer::from_tracks(
        Box::new(NullDevice),
        "songs",
        track_names(5),
        100,
        (320, 240),
        Rc::new(BoxFonts::new()),
    );
    let mut program = program().with_music(player);
    program.memory_mut().config.shuffle_on_track_end = true;
    let mut surface = Surface::new(320, 240);
    program.start(Scripted::new("level", 1, &log).then(vec![]).then(vec![Action::Close]).boxed());

    assert!(program.step(&InputState::new(), &mut surface));
    assert!(!program.step(&InputState::new(), &mut surface));
    assert_eq!(program.frames(), 2);
    assert_eq!(program.memory().music.as_ref().map(|m| m.current_index()), Some(0));
}
