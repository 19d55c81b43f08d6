//! End-to-end tests for PlaybackManager
//!
//! Drives the manager through a scripted transport, a memory library and a
//! memory store, the way a platform driver would.

use lyra_core::{
    KeyValueStore, MemoryLibrary, PlaylistId, PlaylistUpdate, SourceHandle, TrackId,
    TrackLibrary, TrackMetadata,
};
use lyra_playback::{
    map_key, InputFocus, KeyAction, LoadTicket, PlayMode, PlaybackConfig, PlaybackError,
    PlaybackEvent, PlaybackManager, PlaybackState, PlayerCommand, Result, Transport,
    TransportEvent,
};
use lyra_storage::MemoryStore;
use std::sync::Arc;

// ===== Scripted Transport =====

#[derive(Debug, Default)]
struct ScriptedTransport {
    loads: Vec<(SourceHandle, LoadTicket)>,
    plays: usize,
    stops: usize,
    releases: usize,
    seeks: Vec<f64>,
    volume: Option<f64>,
    muted: Option<bool>,
    duration: Option<f64>,
    reject_load: bool,
}

impl ScriptedTransport {
    fn last_ticket(&self) -> LoadTicket {
        self.loads.last().map(|(_, t)| *t).expect("a load was issued")
    }

    fn last_source(&self) -> &SourceHandle {
        &self.loads.last().expect("a load was issued").0
    }
}

impl Transport for ScriptedTransport {
    fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()> {
        if self.reject_load {
            return Err(PlaybackError::transport("unsupported source"));
        }
        self.loads.push((source.clone(), ticket));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.plays += 1;
        Ok(())
    }

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.stops += 1;
    }

    fn seek(&mut self, time_secs: f64) {
        self.seeks.push(time_secs);
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = Some(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = Some(muted);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

// ===== Helpers =====

type Player = PlaybackManager<ScriptedTransport, MemoryStore>;

fn id(name: &str) -> TrackId {
    TrackId::new(name)
}

fn ids(names: &[&str]) -> Vec<TrackId> {
    names.iter().map(|n| TrackId::new(*n)).collect()
}

fn track(name: &str, duration_secs: f64) -> TrackMetadata {
    TrackMetadata::new(
        name,
        format!("Song {name}"),
        duration_secs,
        SourceHandle::Blob(format!("blob-{name}")),
    )
}

fn library(names: &[&str]) -> Arc<MemoryLibrary> {
    Arc::new(MemoryLibrary::from_tracks(
        names.iter().map(|n| track(n, 200.0)),
    ))
}

fn config() -> PlaybackConfig {
    PlaybackConfig {
        shuffle_seed: Some(99),
        ..PlaybackConfig::default()
    }
}

fn player(names: &[&str]) -> Player {
    PlaybackManager::new(
        config(),
        ScriptedTransport::default(),
        library(names),
        MemoryStore::new(),
    )
}

fn finish_load(p: &mut Player) {
    let ticket = p.transport().last_ticket();
    p.handle_transport_event(TransportEvent::Loaded { ticket })
        .expect("load completes");
}

fn current(p: &Player) -> Option<&str> {
    p.cursor().current_id.as_ref().map(TrackId::as_str)
}

// ===== Playback Flow =====

#[test]
fn play_queue_loads_then_plays() {
    let mut p = player(&["A", "B", "C"]);
    p.play_queue(ids(&["A", "B", "C"]), None).unwrap();

    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.state(), PlaybackState::Loading);
    assert_eq!(p.transport().last_source(), &SourceHandle::Blob("blob-A".into()));
    assert_eq!(p.transport().plays, 0);

    finish_load(&mut p);
    assert_eq!(p.state(), PlaybackState::Playing);
    assert_eq!(p.transport().plays, 1);
}

#[test]
fn ended_advances_and_queue_end_stops() {
    let mut p = player(&["A", "B"]);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    finish_load(&mut p);

    p.handle_transport_event(TransportEvent::Ended).unwrap();
    assert_eq!(current(&p), Some("B"));
    finish_load(&mut p);
    p.drain_events();

    p.handle_transport_event(TransportEvent::Ended).unwrap();
    assert_eq!(p.state(), PlaybackState::Stopped);
    assert!(!p.cursor().is_playing);
    assert_eq!(current(&p), Some("B"));
    assert_eq!(p.transport().stops, 1);

    let events = p.drain_events();
    assert!(events.contains(&PlaybackEvent::QueueEnded));
    assert!(events.contains(&PlaybackEvent::StateChanged {
        state: PlaybackState::Stopped
    }));
}

#[test]
fn repeat_all_wraps_on_ended() {
    let mut p = player(&["A", "B"]);
    p.set_play_mode(PlayMode::RepeatAll);
    p.play_queue(ids(&["A", "B"]), Some(&id("B"))).unwrap();
    finish_load(&mut p);

    p.handle_transport_event(TransportEvent::Ended).unwrap();
    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.state(), PlaybackState::Loading);
}

#[test]
fn repeat_one_restarts_without_reloading() {
    let mut p = player(&["A", "B"]);
    p.set_play_mode(PlayMode::RepeatOne);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    finish_load(&mut p);
    let loads = p.transport().loads.len();

    p.handle_transport_event(TransportEvent::Ended).unwrap();
    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.transport().loads.len(), loads);
    assert_eq!(p.transport().seeks.last(), Some(&0.0));
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn next_stops_library_track_played_outside_queue() {
    let mut p = player(&["A"]);
    p.play_track(&id("A")).unwrap();
    finish_load(&mut p);
    assert_eq!(p.state(), PlaybackState::Playing);
    assert!(p.queue().is_empty());
    p.drain_events();

    p.next().unwrap();

    assert_eq!(p.transport().stops, 1);
    assert!(!p.cursor().is_playing);
    assert_eq!(p.state(), PlaybackState::Stopped);
    assert!(p.drain_events().contains(&PlaybackEvent::QueueEnded));
}

#[test]
fn ended_outside_queue_stops_transport() {
    let mut p = player(&["A"]);
    p.play_track(&id("A")).unwrap();
    finish_load(&mut p);

    p.handle_transport_event(TransportEvent::Ended).unwrap();

    assert_eq!(p.transport().stops, 1);
    assert_eq!(p.state(), PlaybackState::Stopped);
}

#[test]
fn repeat_one_restarts_track_outside_queue() {
    let mut p = player(&["A"]);
    p.set_play_mode(PlayMode::RepeatOne);
    p.play_track(&id("A")).unwrap();
    finish_load(&mut p);

    p.handle_transport_event(TransportEvent::Ended).unwrap();

    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.transport().stops, 0);
    assert_eq!(p.transport().seeks.last(), Some(&0.0));
    assert_eq!(p.state(), PlaybackState::Playing);
}

// ===== Load Races =====

#[test]
fn last_skip_wins() {
    let mut p = player(&["A", "B", "C"]);
    p.play_queue(ids(&["A", "B", "C"]), None).unwrap();
    let first = p.transport().last_ticket();

    p.next().unwrap();
    p.next().unwrap();
    assert_eq!(current(&p), Some("C"));

    // The first load finishing late must not start playback
    p.handle_transport_event(TransportEvent::Loaded { ticket: first })
        .unwrap();
    assert_eq!(p.transport().plays, 0);
    assert_eq!(p.state(), PlaybackState::Loading);

    finish_load(&mut p);
    assert_eq!(p.transport().plays, 1);
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn ended_from_superseded_source_is_ignored() {
    let mut p = player(&["A", "B", "C"]);
    p.play_queue(ids(&["A", "B", "C"]), None).unwrap();
    finish_load(&mut p);

    p.next().unwrap();
    assert_eq!(current(&p), Some("B"));

    // The outgoing element can still report its end before B is ready
    p.handle_transport_event(TransportEvent::Ended).unwrap();
    p.handle_transport_event(TransportEvent::TimeUpdate { time_secs: 199.0 })
        .unwrap();
    assert_eq!(current(&p), Some("B"));
    assert_eq!(p.cursor().current_time, 0.0);
}

#[test]
fn stale_load_failure_is_ignored() {
    let mut p = player(&["A", "B"]);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    let first = p.transport().last_ticket();
    p.next().unwrap();

    p.handle_transport_event(TransportEvent::LoadFailed {
        ticket: first,
        message: "decode error".into(),
    })
    .unwrap();

    assert!(p.cursor().is_playing);
    assert!(p.is_loading());
}

// ===== Errors =====

#[test]
fn load_failure_pauses_and_reports() {
    let mut p = player(&["A", "B"]);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    p.drain_events();

    let ticket = p.transport().last_ticket();
    p.handle_transport_event(TransportEvent::LoadFailed {
        ticket,
        message: "decode error".into(),
    })
    .unwrap();

    assert!(!p.cursor().is_playing);
    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.state(), PlaybackState::Paused);
    let events = p.drain_events();
    assert!(events.contains(&PlaybackEvent::Error {
        message: "decode error".into()
    }));

    // No retry until asked; then the same track loads again
    let loads = p.transport().loads.len();
    p.toggle_play_pause().unwrap();
    assert_eq!(p.transport().loads.len(), loads + 1);
}

#[test]
fn blocked_play_pauses_and_reports() {
    let mut p = player(&["A", "B"]);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    finish_load(&mut p);
    assert_eq!(p.state(), PlaybackState::Playing);
    p.drain_events();

    let event = TransportEvent::play_rejected(Some("NotAllowedError"), Some("autoplay blocked"))
        .expect("reported");
    p.handle_transport_event(event).unwrap();

    assert!(!p.cursor().is_playing);
    assert_eq!(current(&p), Some("A"));
    assert_eq!(p.state(), PlaybackState::Paused);
    assert!(p
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { message } if message.contains("NotAllowedError"))));
}

#[test]
fn rejected_load_surfaces_error() {
    let mut p = player(&["A"]);
    p.set_queue(ids(&["A"]));
    p.transport_mut().reject_load = true;

    let err = p.play_track(&id("A")).unwrap_err();
    assert!(matches!(err, PlaybackError::Transport(_)));
    assert!(!p.cursor().is_playing);
}

#[test]
fn unknown_track_is_rejected() {
    let mut p = player(&["A"]);
    let err = p.play_track(&id("nope")).unwrap_err();
    assert!(matches!(err, PlaybackError::TrackNotFound(_)));
    assert!(p.cursor().current_id.is_none());
}

// ===== Seek & Volume =====

#[test]
fn seek_clamps_to_library_duration() {
    let mut p = player(&["A"]);
    p.play_queue(ids(&["A"]), None).unwrap();
    finish_load(&mut p);

    p.seek(500.0);
    assert_eq!(p.cursor().current_time, 200.0);
    p.seek(-3.0);
    assert_eq!(p.cursor().current_time, 0.0);
    p.seek(f64::NAN);
    assert_eq!(p.cursor().current_time, 0.0);
    assert_eq!(p.transport().seeks, vec![200.0, 0.0]);
}

#[test]
fn seek_falls_back_to_transport_duration() {
    let library = Arc::new(MemoryLibrary::from_tracks([track("A", 0.0)]));
    let mut p = PlaybackManager::new(
        config(),
        ScriptedTransport {
            duration: Some(90.0),
            ..ScriptedTransport::default()
        },
        library,
        MemoryStore::new(),
    );
    p.play_queue(ids(&["A"]), None).unwrap();

    p.seek(120.0);
    assert_eq!(p.cursor().current_time, 90.0);
}

#[test]
fn seek_before_load_applies_once_loaded() {
    let mut p = player(&["A"]);
    p.play_queue(ids(&["A"]), None).unwrap();

    p.seek(30.0);
    assert!(p.transport().seeks.is_empty());

    finish_load(&mut p);
    assert_eq!(p.transport().seeks, vec![30.0]);
}

#[test]
fn volume_clamps_and_reaches_transport() {
    let mut p = player(&[]);

    p.set_volume(1.7);
    assert_eq!(p.volume(), 1.0);
    assert_eq!(p.transport().volume, Some(1.0));

    p.set_volume(-0.2);
    assert_eq!(p.volume(), 0.0);

    p.set_volume(f64::INFINITY);
    assert_eq!(p.volume(), 0.0);

    p.toggle_mute();
    assert!(p.is_muted());
    assert_eq!(p.transport().muted, Some(true));
}

// ===== Queue Editing =====

#[test]
fn removing_current_track_stops_playback() {
    let mut p = player(&["A", "B", "C"]);
    p.play_queue(ids(&["A", "B", "C"]), Some(&id("B"))).unwrap();
    finish_load(&mut p);
    let releases = p.transport().releases;

    assert_eq!(p.remove_track(&id("B")), 1);
    assert!(p.cursor().current_id.is_none());
    assert_eq!(p.state(), PlaybackState::Stopped);
    assert_eq!(p.transport().releases, releases + 1);
    assert_eq!(p.queue(), ids(&["A", "C"]).as_slice());
}

#[test]
fn removing_other_track_keeps_playing() {
    let mut p = player(&["A", "B", "C"]);
    p.play_queue(ids(&["A", "B", "C"]), Some(&id("C"))).unwrap();
    finish_load(&mut p);

    p.remove_track(&id("A"));
    assert_eq!(current(&p), Some("C"));
    assert_eq!(p.cursor().position, Some(1));
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn shuffle_play_queue_starts_at_front_of_shuffle_order() {
    let mut p = player(&["A", "B", "C", "D"]);
    p.set_play_mode(PlayMode::Shuffle);
    p.play_queue(ids(&["A", "B", "C", "D"]), None).unwrap();

    let first = p.active_order()[0].clone();
    assert_eq!(p.cursor().current_id.as_ref(), Some(&first));
    assert_eq!(p.cursor().position, Some(0));
}

#[test]
fn play_queue_on_empty_queue_errors() {
    let mut p = player(&[]);
    let err = p.play_queue(Vec::new(), None).unwrap_err();
    assert!(matches!(err, PlaybackError::QueueEmpty));
}

// ===== Playlists =====

#[test]
fn playlist_plays_as_the_queue() {
    let mut p = player(&["A", "B", "C"]);
    let mix = p.create_playlist("Mix", "").unwrap();
    for name in ["C", "A"] {
        assert!(p.add_to_playlist(&mix, id(name)).unwrap());
    }
    assert!(!p.add_to_playlist(&mix, id("A")).unwrap());

    p.play_playlist(&mix, None).unwrap();
    assert_eq!(p.queue(), ids(&["C", "A"]).as_slice());
    assert_eq!(current(&p), Some("C"));
    finish_load(&mut p);

    p.handle_transport_event(TransportEvent::Ended).unwrap();
    assert_eq!(current(&p), Some("A"));
}

#[test]
fn playlist_errors() {
    let mut p = player(&["A"]);
    let empty = p.create_playlist("Empty", "").unwrap();

    assert!(matches!(p.play_playlist(&empty, None), Err(PlaybackError::QueueEmpty)));
    assert!(matches!(
        p.play_playlist(&PlaylistId::new("missing"), None),
        Err(PlaybackError::PlaylistNotFound(_))
    ));
    assert!(matches!(
        p.add_to_playlist(&empty, id("Z")),
        Err(PlaybackError::TrackNotFound(_))
    ));
    assert!(matches!(
        p.create_playlist("  ", ""),
        Err(PlaybackError::InvalidInput(_))
    ));
}

#[test]
fn forgetting_a_track_cascades_to_playlists_and_queue() {
    let mut p = player(&["A", "B"]);
    let first = p.create_playlist("First", "").unwrap();
    let second = p.create_playlist("Second", "").unwrap();
    p.add_to_playlist(&first, id("A")).unwrap();
    p.add_to_playlist(&first, id("B")).unwrap();
    p.add_to_playlist(&second, id("A")).unwrap();

    p.play_queue(ids(&["A", "B"]), None).unwrap();
    finish_load(&mut p);
    p.drain_events();

    assert_eq!(p.forget_track(&id("A")), 1);

    assert!(p.playlists().containing(&id("A")).is_empty());
    assert_eq!(p.playlists().get(&first).unwrap().track_ids, ids(&["B"]));
    assert_eq!(p.queue(), ids(&["B"]).as_slice());
    assert!(p.cursor().current_id.is_none());
    assert_eq!(p.transport().stops, 1);
    assert!(p
        .drain_events()
        .contains(&PlaybackEvent::PlaylistsChanged { count: 2 }));
}

#[test]
fn playlists_survive_restart() {
    let library = library(&["A", "B"]);
    let mut p = PlaybackManager::new(
        config(),
        ScriptedTransport::default(),
        Arc::clone(&library) as Arc<dyn TrackLibrary>,
        MemoryStore::new(),
    );
    let mix = p.create_playlist("Mix", "evening").unwrap();
    p.add_to_playlist(&mix, id("B")).unwrap();
    p.update_playlist(
        &mix,
        PlaylistUpdate {
            name: Some("Late mix".into()),
            ..PlaylistUpdate::default()
        },
    )
    .unwrap();

    let saved = p.store().get("playlists").unwrap().expect("playlists saved");
    let mut store = MemoryStore::new();
    store.set("playlists", &saved).unwrap();
    let mut restored =
        PlaybackManager::new(config(), ScriptedTransport::default(), library, store);
    restored.restore();

    let playlist = restored.playlists().get(&mix).expect("restored");
    assert_eq!(playlist.name, "Late mix");
    assert_eq!(playlist.description, "evening");
    assert_eq!(playlist.track_ids, ids(&["B"]));
}

#[test]
fn exported_playlist_imports_by_tags() {
    let mut p = player(&["A", "B"]);
    let mix = p.create_playlist("Mix", "").unwrap();
    p.add_to_playlist(&mix, id("B")).unwrap();
    p.add_to_playlist(&mix, id("A")).unwrap();
    let json = p.export_playlist(&mix).unwrap();

    let mut other = player(&["A", "B"]);
    let report = other.import_playlist(&json).unwrap();

    assert_eq!((report.total, report.matched, report.unmatched), (2, 2, 0));
    let imported = other.playlists().get(&report.playlist_id).unwrap();
    assert_eq!(imported.name, "Mix");
    assert_eq!(imported.track_ids, ids(&["B", "A"]));

    assert!(matches!(
        other.import_playlist("{oops"),
        Err(PlaybackError::InvalidInput(_))
    ));
}

// ===== Persistence =====

#[test]
fn preferences_survive_restart_but_cursor_does_not() {
    let library = library(&["A", "B"]);
    let mut p = PlaybackManager::new(
        config(),
        ScriptedTransport::default(),
        Arc::clone(&library) as Arc<dyn TrackLibrary>,
        MemoryStore::new(),
    );
    p.set_volume(0.25);
    p.set_play_mode(PlayMode::RepeatAll);
    p.play_queue(ids(&["A", "B", "A"]), None).unwrap();
    finish_load(&mut p);

    let saved = p.store().get("player-state").unwrap().expect("state saved");
    let json: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(json["playMode"], "repeat-all");
    assert_eq!(json["volume"], 0.25);
    assert!(json.get("currentId").is_none());

    let mut store = MemoryStore::new();
    store.set("player-state", &saved).unwrap();
    let mut restored =
        PlaybackManager::new(config(), ScriptedTransport::default(), library, store);
    restored.restore();

    assert_eq!(restored.volume(), 0.25);
    assert_eq!(restored.play_mode(), PlayMode::RepeatAll);
    assert_eq!(restored.queue(), ids(&["A", "B", "A"]).as_slice());
    assert!(restored.cursor().current_id.is_none());
    assert!(!restored.cursor().is_playing);
    assert_eq!(restored.state(), PlaybackState::Stopped);
    assert!(restored.transport().loads.is_empty());
}

#[test]
fn corrupt_saved_state_falls_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.insert_raw("music-player:player-state", "{not json");

    let mut p = PlaybackManager::new(config(), ScriptedTransport::default(), library(&[]), store);
    p.restore();

    assert_eq!(p.volume(), 0.7);
    assert_eq!(p.play_mode(), PlayMode::Sequential);
    assert!(p.queue().is_empty());
}

#[test]
fn full_store_does_not_break_playback() {
    let mut p = PlaybackManager::new(
        config(),
        ScriptedTransport::default(),
        library(&["A"]),
        MemoryStore::with_quota(4),
    );
    p.play_queue(ids(&["A"]), None).unwrap();
    finish_load(&mut p);

    assert_eq!(p.state(), PlaybackState::Playing);
    assert!(p.store().get("player-state").unwrap().is_none());
}

// ===== Keyboard =====

#[test]
fn keyboard_drives_player() {
    let mut p = player(&["A", "B"]);
    p.play_queue(ids(&["A", "B"]), None).unwrap();
    finish_load(&mut p);

    let press = |p: &mut Player, key: &str| match map_key(key, InputFocus::None) {
        Some(KeyAction::Command(command)) => p.handle_command(command).unwrap(),
        other => panic!("{key:?} mapped to {other:?}"),
    };

    press(&mut p, " ");
    assert_eq!(p.state(), PlaybackState::Paused);
    press(&mut p, " ");
    assert_eq!(p.state(), PlaybackState::Playing);

    press(&mut p, "ArrowRight");
    assert_eq!(current(&p), Some("B"));
    press(&mut p, "ArrowLeft");
    assert_eq!(current(&p), Some("A"));

    press(&mut p, "ArrowDown");
    assert!((p.volume() - 0.6).abs() < 1e-9);

    press(&mut p, "r");
    assert_eq!(p.play_mode(), PlayMode::RepeatOne);

    press(&mut p, "m");
    assert!(p.is_muted());

    press(&mut p, "l");
    assert_eq!(p.current_track().map(|t| t.liked), Some(true));
}

#[test]
fn typing_in_a_text_field_is_not_a_command() {
    for key in [" ", "ArrowRight", "m", "l", "r", "s"] {
        assert_eq!(map_key(key, InputFocus::TextInput), None);
    }
    assert_eq!(
        map_key("Escape", InputFocus::TextInput),
        Some(KeyAction::ReleaseFocus)
    );
}

#[test]
fn toggle_like_without_track_is_noop() {
    let mut p = player(&["A"]);
    p.handle_command(PlayerCommand::ToggleLike).unwrap();
    assert!(p.current_track().is_none());
}
