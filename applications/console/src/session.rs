//! Interactive player session
//!
//! Parses console commands, runs them against the playback manager and
//! pumps the simulated transport into it.

use crate::error::{ConsoleError, Result};
use crate::sim_transport::SimulatedTransport;
use lyra_core::{KeyValueStore, MemoryLibrary, Playlist, PlaylistId, TrackId, TrackLibrary};
use lyra_playback::{
    map_key, InputFocus, KeyAction, PlaybackConfig, PlaybackEvent, PlaybackManager,
    PlaybackState,
};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// One line of console input
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Play a track, or resume when no id is given
    Play(Option<TrackId>),
    /// Replace the queue; empty means the whole library
    Queue(Vec<TrackId>),
    /// Append to the queue
    Add(Vec<TrackId>),
    /// Remove every occurrence of a track
    Remove(TrackId),
    /// Empty the queue
    Clear,
    /// Delete a track from the library, its playlists and the queue
    Delete(TrackId),
    /// Playlist management
    Playlist(PlaylistCommand),
    Toggle,
    Pause,
    Next,
    Previous,
    Seek(f64),
    Volume(f64),
    Mute,
    /// Set the mode, or cycle when no name is given
    Mode(Option<String>),
    Like,
    /// Feed a raw key name through the shortcut map
    Key(String),
    Status,
    List,
    Artists,
    Albums,
    Help,
    Quit,
}

/// `pl` subcommands; playlists are named by id or exact name
#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistCommand {
    List,
    Show(String),
    Create(String),
    Delete(String),
    Add(String, Vec<TrackId>),
    Remove(String, TrackId),
    /// Move entry `from` to `to`, both 1-based
    Move(String, usize, usize),
    Play(String),
    Export(String, PathBuf),
    Import(PathBuf),
}

impl PlaylistCommand {
    fn parse(rest: &[&str]) -> Result<Self> {
        let Some((sub, args)) = rest.split_first() else {
            return Ok(Self::List);
        };
        let target = || one_arg(args, sub).map(str::to_string);

        let command = match *sub {
            "list" | "ls" => Self::List,
            "show" => Self::Show(target()?),
            "new" => {
                if args.is_empty() {
                    return Err(ConsoleError::BadArgument("new needs a name".to_string()));
                }
                Self::Create(args.join(" "))
            }
            "del" | "delete" => Self::Delete(target()?),
            "add" => Self::Add(target()?, args[1..].iter().map(|w| TrackId::new(*w)).collect()),
            "rm" | "remove" => Self::Remove(target()?, TrackId::new(one_arg(&args[1..], sub)?)),
            "move" | "mv" => {
                let playlist = target()?;
                let from = index_arg(&args[1..], sub)?;
                let to = index_arg(&args[2..], sub)?;
                Self::Move(playlist, from, to)
            }
            "play" => Self::Play(target()?),
            "export" => Self::Export(target()?, PathBuf::from(one_arg(&args[1..], sub)?)),
            "import" => Self::Import(PathBuf::from(one_arg(args, sub)?)),
            other => return Err(ConsoleError::UnknownCommand(format!("pl {}", other))),
        };
        Ok(command)
    }
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ConsoleError::UnknownCommand(String::new()));
        };
        let rest: Vec<&str> = words.collect();
        let ids = || rest.iter().map(|w| TrackId::new(*w)).collect::<Vec<_>>();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => ConsoleCommand::Play(rest.first().map(|w| TrackId::new(*w))),
            "queue" => ConsoleCommand::Queue(ids()),
            "add" => ConsoleCommand::Add(ids()),
            "remove" | "rm" => ConsoleCommand::Remove(TrackId::new(one_arg(&rest, name)?)),
            "clear" => ConsoleCommand::Clear,
            "delete" => ConsoleCommand::Delete(TrackId::new(one_arg(&rest, name)?)),
            "pl" | "playlist" => ConsoleCommand::Playlist(PlaylistCommand::parse(&rest)?),
            "toggle" | "p" => ConsoleCommand::Toggle,
            "pause" => ConsoleCommand::Pause,
            "next" | "n" => ConsoleCommand::Next,
            "prev" | "previous" => ConsoleCommand::Previous,
            "seek" => ConsoleCommand::Seek(number_arg(&rest, name)?),
            "vol" | "volume" => ConsoleCommand::Volume(number_arg(&rest, name)?),
            "mute" => ConsoleCommand::Mute,
            "mode" => ConsoleCommand::Mode(rest.first().map(|w| (*w).to_string())),
            "like" => ConsoleCommand::Like,
            "key" => ConsoleCommand::Key(key_arg(line)),
            "status" | "s" => ConsoleCommand::Status,
            "list" | "ls" => ConsoleCommand::List,
            "artists" => ConsoleCommand::Artists,
            "albums" => ConsoleCommand::Albums,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(ConsoleError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn one_arg<'a>(rest: &[&'a str], command: &str) -> Result<&'a str> {
    rest.first()
        .copied()
        .ok_or_else(|| ConsoleError::BadArgument(format!("{} needs an argument", command)))
}

fn index_arg(rest: &[&str], command: &str) -> Result<usize> {
    let raw = one_arg(rest, command)?;
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConsoleError::BadArgument(format!("{} expects a position, got {}", command, raw)))
}

fn number_arg(rest: &[&str], command: &str) -> Result<f64> {
    let raw = one_arg(rest, command)?;
    raw.parse()
        .map_err(|_| ConsoleError::BadArgument(format!("{} expects a number, got {}", command, raw)))
}

// "key  " must yield the space key, so take the raw remainder
fn key_arg(line: &str) -> String {
    let rest = line.trim_start();
    let rest = rest.get(3..).unwrap_or_default();
    match rest.strip_prefix(' ') {
        Some(key) if !key.trim().is_empty() => key.trim().to_string(),
        Some(key) if !key.is_empty() => " ".to_string(),
        _ => String::new(),
    }
}

pub const HELP: &str = "\
commands:
  play [id]          play a track (resume without id)
  queue [ids..]      replace the queue (whole library without ids)
  add <ids..>        append to the queue
  remove <id>        remove a track from the queue
  clear              empty the queue
  delete <id>        delete a track from the library and every playlist
  pl [list]          list playlists
  pl new <name>      create a playlist
  pl show|play|del <playlist>
  pl add <playlist> <ids..> | pl rm <playlist> <id>
  pl move <playlist> <from> <to>
  pl export <playlist> <file> | pl import <file>
  toggle | pause     play/pause
  next | prev        skip
  seek <secs>        jump within the track
  vol <0-1>          set volume
  mute               toggle mute
  mode [name]        sequential, repeat-one, repeat-all, shuffle (cycle without name)
  like               toggle like on the current track
  key <key>          send a keyboard shortcut (space, ArrowRight, m, r, l, ...)
  status | list      show player state or the library
  artists | albums   list distinct artists or albums
  quit";

/// What the driver should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

/// Playback manager bound to the simulated transport
pub struct Session<S> {
    player: PlaybackManager<SimulatedTransport, S>,
    library: Arc<MemoryLibrary>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(config: PlaybackConfig, library: Arc<MemoryLibrary>, store: S) -> Self {
        let transport = SimulatedTransport::from_library(&library);
        let player = PlaybackManager::new(
            config,
            transport,
            Arc::clone(&library) as Arc<dyn TrackLibrary>,
            store,
        );
        Self { player, library }
    }

    /// Load saved preferences and queue, dropping ids the library lost
    pub fn restore(&mut self) {
        self.player.restore();

        let missing: Vec<TrackId> = self
            .player
            .queue()
            .iter()
            .filter(|id| !self.library.contains(id))
            .cloned()
            .collect();
        for id in missing {
            warn!(track_id = %id, "Queued track no longer in library");
            self.player.remove_track(&id);
        }
    }

    pub fn player(&self) -> &PlaybackManager<SimulatedTransport, S> {
        &self.player
    }

    /// Run one command
    pub fn execute(&mut self, command: ConsoleCommand) -> Result<Outcome> {
        let reply = match command {
            ConsoleCommand::Play(Some(id)) => {
                if !self.player.queue().contains(&id) {
                    self.player.append_to_queue([id.clone()]);
                }
                self.player.play_track(&id)?;
                format!("playing {}", id)
            }
            ConsoleCommand::Play(None) | ConsoleCommand::Toggle => {
                self.player.toggle_play_pause()?;
                self.status_line()
            }
            ConsoleCommand::Queue(ids) => {
                let ids = if ids.is_empty() { self.library.ids() } else { ids };
                self.player.play_queue(ids, None)?;
                format!("queued {} tracks", self.player.queue().len())
            }
            ConsoleCommand::Add(ids) => {
                self.player.append_to_queue(ids);
                format!("queue has {} tracks", self.player.queue().len())
            }
            ConsoleCommand::Remove(id) => {
                let removed = self.player.remove_track(&id);
                format!("removed {} entries", removed)
            }
            ConsoleCommand::Clear => {
                self.player.clear_queue();
                "queue cleared".to_string()
            }
            ConsoleCommand::Delete(id) => {
                if self.library.remove(&id).is_none() {
                    return Err(lyra_playback::PlaybackError::TrackNotFound(id).into());
                }
                self.player.forget_track(&id);
                format!("deleted {}", id)
            }
            ConsoleCommand::Playlist(command) => self.run_playlist(command)?,
            ConsoleCommand::Pause => {
                self.player.pause();
                self.status_line()
            }
            ConsoleCommand::Next => {
                self.player.next()?;
                self.status_line()
            }
            ConsoleCommand::Previous => {
                self.player.previous()?;
                self.status_line()
            }
            ConsoleCommand::Seek(secs) => {
                self.player.seek(secs);
                self.status_line()
            }
            ConsoleCommand::Volume(level) => {
                self.player.set_volume(level);
                format!("volume {:.0}%", self.player.volume() * 100.0)
            }
            ConsoleCommand::Mute => {
                self.player.toggle_mute();
                let label = if self.player.is_muted() { "muted" } else { "unmuted" };
                label.to_string()
            }
            ConsoleCommand::Mode(Some(name)) => {
                if !self.player.set_play_mode_named(&name) {
                    return Err(ConsoleError::BadArgument(format!("unknown mode {}", name)));
                }
                format!("mode {}", self.player.play_mode())
            }
            ConsoleCommand::Mode(None) => format!("mode {}", self.player.cycle_play_mode()),
            ConsoleCommand::Like => match self.player.toggle_like() {
                Some(true) => "liked".to_string(),
                Some(false) => "unliked".to_string(),
                None => "nothing playing".to_string(),
            },
            ConsoleCommand::Key(key) => match map_key(&key, InputFocus::None) {
                Some(KeyAction::Command(command)) => {
                    self.player.handle_command(command)?;
                    self.status_line()
                }
                Some(action) => format!("{:?} has no effect here", action),
                None => format!("no shortcut for {:?}", key),
            },
            ConsoleCommand::Status => self.status_line(),
            ConsoleCommand::List => self.library_listing(),
            ConsoleCommand::Artists => self.library.artists().join("\n"),
            ConsoleCommand::Albums => self.library.albums().join("\n"),
            ConsoleCommand::Help => HELP.to_string(),
            ConsoleCommand::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(reply))
    }

    fn run_playlist(&mut self, command: PlaylistCommand) -> Result<String> {
        let reply = match command {
            PlaylistCommand::List => {
                let lines: Vec<String> = self
                    .player
                    .playlists()
                    .iter()
                    .map(|p| format!("{}  {} ({} tracks)", p.id, p.name, p.len()))
                    .collect();
                if lines.is_empty() {
                    "no playlists".to_string()
                } else {
                    lines.join("\n")
                }
            }
            PlaylistCommand::Show(key) => {
                let playlist = self.playlist(&key)?;
                let mut out = playlist.name.clone();
                for (n, id) in playlist.track_ids.iter().enumerate() {
                    let title = self.library.track(id).map_or_else(|| "?".to_string(), |t| t.title);
                    let _ = write!(out, "\n{:>3}. {} [{}]", n + 1, title, id);
                }
                out
            }
            PlaylistCommand::Create(name) => {
                let id = self.player.create_playlist(&name, "")?;
                format!("created {} ({})", name.trim(), id)
            }
            PlaylistCommand::Delete(key) => {
                let id = self.playlist_id(&key)?;
                self.player.delete_playlist(&id);
                format!("deleted playlist {}", key)
            }
            PlaylistCommand::Add(key, tracks) => {
                let id = self.playlist_id(&key)?;
                let mut added = 0;
                for track in tracks {
                    if self.player.add_to_playlist(&id, track)? {
                        added += 1;
                    }
                }
                format!("added {} tracks", added)
            }
            PlaylistCommand::Remove(key, track) => {
                let id = self.playlist_id(&key)?;
                let label = if self.player.remove_from_playlist(&id, &track)? {
                    "removed"
                } else {
                    "not in playlist"
                };
                label.to_string()
            }
            PlaylistCommand::Move(key, from, to) => {
                let id = self.playlist_id(&key)?;
                if !self.player.reorder_playlist(&id, from - 1, to - 1)? {
                    return Err(ConsoleError::BadArgument(format!("no entry {} or {}", from, to)));
                }
                "moved".to_string()
            }
            PlaylistCommand::Play(key) => {
                let id = self.playlist_id(&key)?;
                self.player.play_playlist(&id, None)?;
                format!("playing {} ({} tracks)", key, self.player.queue().len())
            }
            PlaylistCommand::Export(key, path) => {
                let id = self.playlist_id(&key)?;
                let json = self.player.export_playlist(&id)?;
                fs::write(&path, json)?;
                format!("exported to {}", path.display())
            }
            PlaylistCommand::Import(path) => {
                let json = fs::read_to_string(&path)?;
                let report = self.player.import_playlist(&json)?;
                format!(
                    "imported {} of {} tracks ({} unmatched)",
                    report.matched, report.total, report.unmatched
                )
            }
        };
        Ok(reply)
    }

    fn playlist(&self, key: &str) -> Result<&Playlist> {
        self.player
            .playlists()
            .find(key)
            .ok_or_else(|| ConsoleError::BadArgument(format!("no playlist {}", key)))
    }

    fn playlist_id(&self, key: &str) -> Result<PlaylistId> {
        self.playlist(key).map(|p| p.id.clone())
    }

    /// Advance the simulated clock and feed the transport's reports back
    pub fn tick(&mut self, elapsed: Duration) -> Vec<PlaybackEvent> {
        let events = self.player.transport_mut().tick(elapsed);
        for event in events {
            if let Err(e) = self.player.handle_transport_event(event) {
                warn!(error = %e, "Transport event failed");
            }
        }
        self.player.drain_events()
    }

    /// Drop events produced by commands (replies already describe them)
    pub fn discard_events(&mut self) {
        self.player.drain_events();
    }

    pub fn status_line(&self) -> String {
        let cursor = self.player.cursor();
        let state = match self.player.state() {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Loading => "loading",
            PlaybackState::Stopped => "stopped",
        };

        let mut line = state.to_string();
        if let Some(track) = self.player.current_track() {
            let _ = write!(line, " {} [{}]", track.title, track.id);
            let _ = write!(
                line,
                " {} / {}",
                clock(cursor.current_time),
                clock(track.duration_secs)
            );
        }
        let _ = write!(
            line,
            " | {} | vol {:.0}%{}",
            self.player.play_mode(),
            self.player.volume() * 100.0,
            if self.player.is_muted() { " (muted)" } else { "" }
        );
        if let Some(position) = cursor.position {
            let _ = write!(line, " | {}/{}", position + 1, self.player.active_order().len());
        }
        line
    }

    fn library_listing(&self) -> String {
        let current = self.player.cursor().current_id.as_ref();
        self.library
            .ids()
            .iter()
            .filter_map(|id| self.library.track(id))
            .map(|t| {
                format!(
                    "{} {:<12} {} - {} ({}){}",
                    if Some(&t.id) == current { '>' } else { ' ' },
                    t.id,
                    t.artist.as_deref().unwrap_or("Unknown"),
                    t.title,
                    clock(t.duration_secs),
                    if t.liked { " *" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render an event for the console, if it is worth showing
pub fn describe(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::TrackChanged { track_id, .. } => Some(format!("now playing {}", track_id)),
        PlaybackEvent::QueueEnded => Some("end of queue".to_string()),
        PlaybackEvent::Error { message } => Some(format!("error: {}", message)),
        PlaybackEvent::PlayModeChanged { mode } => Some(format!("mode {}", mode)),
        _ => None,
    }
}

fn clock(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
