mod common;

use std::path::PathBuf;

use common::temp_dir;
use scenebase::config::{DEFAULT_TICK_RATE, GameConfig, MusicConfig};
use scenebase::window::WindowMode;

#[test]
fn defaults() {
    let cfg = GameConfig::default();
    assert_eq!(cfg.tick_rate, DEFAULT_TICK_RATE);
    assert_eq!(cfg.tick_rate, 120);
    assert!(cfg.music.is_none());
    assert!(cfg.fonts_folder.is_none());
    assert!(!cfg.fade_music);
    assert!(!cfg.shuffle_on_track_end);
}

#[test]
fn music_defaults_to_songs_folder_at_full_volume() {
    let music = MusicConfig::default();
    assert_eq!(music.folder, PathBuf::from("songs"));
    assert_eq!(music.volume_percent, 100);
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = GameConfig::from_json(
        r#"{
            "window": { "title": "Demo", "mode": "fullscreen" },
            "music": { "volume_percent": 40 },
            "fade_music": true
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.window.title, "Demo");
    assert_eq!(cfg.window.mode, WindowMode::Fullscreen);
    assert_eq!(cfg.window.logical_width, 1280);
    let music = cfg.music.unwrap();
    assert_eq!(music.volume_percent, 40);
    assert_eq!(music.folder, PathBuf::from("songs"));
    assert!(cfg.fade_music);
    assert_eq!(cfg.tick_rate, 120);
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = GameConfig::from_json("{ tick_rate: }").unwrap_err();
    assert!(matches!(err, scenebase::Error::Config(_)));
}

#[test]
fn load_reads_file() {
    let dir = temp_dir("config");
    let path = dir.join("game.json");
    let cfg = GameConfig { tick_rate: 60, ..GameConfig::with_size(640, 360) };
    std::fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();

    assert_eq!(GameConfig::load(&path).unwrap(), cfg);
    assert!(GameConfig::load(dir.join("missing.json")).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}
