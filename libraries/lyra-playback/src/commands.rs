//! Keyboard and UI intents
//!
//! Maps raw key names (DOM `KeyboardEvent.key` values) onto player commands.
//! While a text field has focus every shortcut is suppressed so typing a
//! space or an `l` never reaches the player; only Escape gets through, to
//! give focus back.

use serde::{Deserialize, Serialize};

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerCommand {
    /// Play or pause
    TogglePlay,
    /// Next track
    Next,
    /// Previous track
    Previous,
    /// Raise volume by one step
    VolumeUp,
    /// Lower volume by one step
    VolumeDown,
    /// Cycle play mode
    ToggleMode,
    /// Mute or unmute
    ToggleMute,
    /// Flip the liked flag of the current track
    ToggleLike,
}

/// What currently holds keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    /// Nothing that accepts text
    #[default]
    None,
    /// A text input, textarea or contenteditable element
    TextInput,
}

/// Result of mapping a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "command", rename_all = "camelCase")]
pub enum KeyAction {
    /// Dispatch a player command
    Command(PlayerCommand),
    /// Move focus to the search box
    FocusSearch,
    /// Give up text-input focus
    ReleaseFocus,
}

/// Map a key to an action
pub fn map_key(key: &str, focus: InputFocus) -> Option<KeyAction> {
    if focus == InputFocus::TextInput {
        return (key == "Escape").then_some(KeyAction::ReleaseFocus);
    }

    let command = match key {
        " " => PlayerCommand::TogglePlay,
        "ArrowRight" => PlayerCommand::Next,
        "ArrowLeft" => PlayerCommand::Previous,
        "ArrowUp" => PlayerCommand::VolumeUp,
        "ArrowDown" => PlayerCommand::VolumeDown,
        "r" | "R" => PlayerCommand::ToggleMode,
        "m" | "M" => PlayerCommand::ToggleMute,
        "l" | "L" => PlayerCommand::ToggleLike,
        "s" | "S" => return Some(KeyAction::FocusSearch),
        _ => return None,
    };
    Some(KeyAction::Command(command))
}

/// Whether the browser's default action for `key` must be suppressed
///
/// Space and the arrow keys would otherwise scroll the page.
pub fn prevents_default(key: &str) -> bool {
    matches!(key, " " | "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown")
}
