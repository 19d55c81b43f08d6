//! Console integration tests
//!
//! Runs the full console stack (manifest, config, JSON state file, simulated
//! clock) inside a temporary directory.

use lyra_console::{
    config::{ConsoleConfig, Overrides},
    manifest,
    session::{ConsoleCommand, Outcome, Session},
    ConsoleError,
};
use lyra_core::TrackId;
use lyra_playback::{PlayMode, PlaybackConfig, PlaybackEvent, PlaybackState};
use lyra_storage::JsonFileStore;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const TICK: Duration = Duration::from_secs(1);

const MANIFEST: &str = r#"[
    { "id": "a", "title": "Alpha", "artist": "One", "duration_secs": 2, "path": "a.flac" },
    { "id": "b", "title": "Beta", "artist": "Two", "duration_secs": 3, "path": "b.flac" },
    { "id": "c", "title": "Gamma", "duration_secs": 0, "url": "https://example.com/c.mp3" }
]"#;

fn write_manifest(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("library.json");
    fs::write(&path, MANIFEST).unwrap();
    path
}

fn session(dir: &Path, config: &ConsoleConfig) -> Session<JsonFileStore> {
    let library = Arc::new(manifest::load(&write_manifest(dir)).unwrap());
    let store = JsonFileStore::open(dir.join("state.json")).unwrap();
    Session::new(config.playback.clone(), library, store)
}

fn run(session: &mut Session<JsonFileStore>, line: &str) -> String {
    match session.execute(line.parse().unwrap()).unwrap() {
        Outcome::Continue(reply) => reply,
        Outcome::Quit => panic!("unexpected quit"),
    }
}

fn run_ticks(session: &mut Session<JsonFileStore>, n: usize) -> Vec<PlaybackEvent> {
    (0..n).flat_map(|_| session.tick(TICK)).collect()
}

fn current(session: &Session<JsonFileStore>) -> Option<&str> {
    session
        .player()
        .cursor()
        .current_id
        .as_ref()
        .map(TrackId::as_str)
}

#[test]
fn queue_plays_through_in_order() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());

    run(&mut s, "queue a b");
    assert_eq!(s.player().state(), PlaybackState::Loading);

    // Load, then two seconds of "a"
    let events = run_ticks(&mut s, 3);
    assert!(events.contains(&PlaybackEvent::TrackChanged {
        track_id: TrackId::new("b"),
        previous_track_id: Some(TrackId::new("a")),
    }));
    assert_eq!(current(&s), Some("b"));

    // Load, then three seconds of "b", then the queue runs out
    let events = run_ticks(&mut s, 4);
    assert!(events.contains(&PlaybackEvent::QueueEnded));
    assert_eq!(s.player().state(), PlaybackState::Stopped);
}

#[test]
fn unknown_library_duration_falls_back_to_clock() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());

    run(&mut s, "play c");
    run_ticks(&mut s, 1);
    run(&mut s, "seek 9999");

    assert_eq!(
        s.player().cursor().current_time,
        lyra_console::sim_transport::FALLBACK_DURATION_SECS
    );
}

#[test]
fn repeat_all_wraps_through_ticks() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());

    run(&mut s, "mode repeat-all");
    run(&mut s, "queue a b");
    run_ticks(&mut s, 3 + 4);

    assert_eq!(current(&s), Some("a"));
    assert!(s.player().cursor().is_playing);
}

#[test]
fn shortcuts_reach_the_player() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());

    run(&mut s, "queue");
    run_ticks(&mut s, 1);

    run(&mut s, "key ArrowRight");
    assert_eq!(current(&s), Some("b"));
    run(&mut s, "key m");
    assert!(s.player().is_muted());
    run(&mut s, "key r");
    assert_eq!(s.player().play_mode(), PlayMode::RepeatOne);

    let reply = run(&mut s, "key s");
    assert!(reply.contains("FocusSearch"));
}

#[test]
fn preferences_persist_between_sessions() {
    let dir = TempDir::new().unwrap();
    let config = ConsoleConfig::default();

    {
        let mut s = session(dir.path(), &config);
        run(&mut s, "vol 0.3");
        run(&mut s, "mode shuffle");
        run(&mut s, "queue b a");
        run_ticks(&mut s, 2);
    }

    let mut s = session(dir.path(), &config);
    s.restore();

    assert_eq!(s.player().volume(), 0.3);
    assert_eq!(s.player().play_mode(), PlayMode::Shuffle);
    assert_eq!(
        s.player().queue(),
        [TrackId::new("b"), TrackId::new("a")].as_slice()
    );
    assert!(current(&s).is_none());
    assert_eq!(s.player().state(), PlaybackState::Stopped);
}

#[test]
fn playlists_play_persist_and_follow_deletes() {
    let dir = TempDir::new().unwrap();
    let config = ConsoleConfig::default();

    {
        let mut s = session(dir.path(), &config);
        assert!(run(&mut s, "pl new Mix").starts_with("created Mix"));
        assert_eq!(run(&mut s, "pl add Mix b a b"), "added 2 tracks");

        run(&mut s, "pl play Mix");
        assert_eq!(current(&s), Some("b"));
        assert_eq!(
            s.player().queue(),
            [TrackId::new("b"), TrackId::new("a")].as_slice()
        );

        run(&mut s, "pl move Mix 2 1");
        assert!(run(&mut s, "pl show Mix").contains("1. Alpha [a]"));
    }

    let mut s = session(dir.path(), &config);
    s.restore();
    let playlist = s.player().playlists().find("Mix").expect("saved playlist");
    assert_eq!(playlist.track_ids, vec![TrackId::new("a"), TrackId::new("b")]);

    run(&mut s, "delete a");
    let playlist = s.player().playlists().find("Mix").unwrap();
    assert_eq!(playlist.track_ids, vec![TrackId::new("b")]);
    assert!(!s.player().queue().contains(&TrackId::new("a")));

    assert!(matches!(
        s.execute("delete a".parse().unwrap()),
        Err(ConsoleError::Playback(_))
    ));
}

#[test]
fn playlist_export_and_import_through_files() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());
    let file = dir.path().join("mix.json");

    run(&mut s, "pl new Mix");
    run(&mut s, "pl add Mix a c");
    run(&mut s, &format!("pl export Mix {}", file.display()));
    run(&mut s, "pl del Mix");
    assert_eq!(run(&mut s, "pl"), "no playlists");

    let reply = run(&mut s, &format!("pl import {}", file.display()));
    assert_eq!(reply, "imported 2 of 2 tracks (0 unmatched)");
    assert_eq!(s.player().playlists().len(), 1);
}

#[test]
fn artists_and_albums_are_listed() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());

    assert_eq!(run(&mut s, "artists"), "One\nTwo");
    assert_eq!(run(&mut s, "albums"), "");
}

#[test]
fn restore_drops_tracks_missing_from_library() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("state.json"),
        r#"{"music-player:player-state": "{\"volume\":0.5,\"isMuted\":false,\"playMode\":\"sequential\",\"queue\":[\"a\",\"gone\",\"b\"]}"}"#,
    )
    .unwrap();

    let mut s = session(dir.path(), &ConsoleConfig::default());
    s.restore();

    assert_eq!(
        s.player().queue(),
        [TrackId::new("a"), TrackId::new("b")].as_slice()
    );
    assert_eq!(s.player().volume(), 0.5);
}

#[test]
fn config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lyra.toml");
    fs::write(
        &path,
        r#"
tick_ms = 100

[library]
manifest = "tracks.json"

[playback]
volume = 0.4
play_mode = "repeat-all"
"#,
    )
    .unwrap();

    let config = ConsoleConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.tick_ms, 100);
    assert_eq!(config.playback.volume, 0.4);
    assert_eq!(config.playback.play_mode, PlayMode::RepeatAll);
    assert_eq!(config.storage.state_file, Path::new("lyra-state.json"));
    config.validate().unwrap();

    let config = config.with_overrides(Overrides {
        play_mode: Some(PlayMode::Shuffle),
        shuffle_seed: Some(8),
        no_persist: true,
        ..Overrides::default()
    });
    assert_eq!(config.playback.play_mode, PlayMode::Shuffle);
    assert_eq!(config.playback.shuffle_seed, Some(8));
    assert!(!config.playback.persist);
    assert_eq!(config.library.manifest, Path::new("tracks.json"));
}

#[test]
fn invalid_config_is_rejected() {
    let config = ConsoleConfig {
        playback: PlaybackConfig {
            volume: 1.5,
            ..PlaybackConfig::default()
        },
        ..ConsoleConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));

    let config = ConsoleConfig {
        tick_ms: 0,
        ..ConsoleConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn quit_ends_session() {
    let dir = TempDir::new().unwrap();
    let mut s = session(dir.path(), &ConsoleConfig::default());
    assert_eq!(s.execute(ConsoleCommand::Quit).unwrap(), Outcome::Quit);
}
