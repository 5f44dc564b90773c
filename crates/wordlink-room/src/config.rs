//! Registry configuration and the room state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Default room code alphabet: uppercase base-36.
pub const DEFAULT_CODE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Configuration for a [`RoomRegistry`](crate::RoomRegistry).
///
/// Every field has a default, so a partial JSON object deserializes into
/// a complete config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of characters in a fresh room code.
    pub code_length: usize,

    /// Characters a room code is drawn from. Must be ASCII alphanumeric;
    /// lowercase letters are folded to uppercase.
    pub code_alphabet: String,

    /// Random draws at the current length before the code widens by one
    /// character.
    pub max_code_attempts: u32,

    /// Longest accepted username, in characters, after trimming.
    pub max_username_len: usize,

    /// Category catalogue. Each new room draws one entry uniformly.
    pub categories: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            code_length: 4,
            code_alphabet: DEFAULT_CODE_ALPHABET.to_string(),
            max_code_attempts: 64,
            max_username_len: 32,
            categories: [
                "Animals",
                "Food",
                "Cities",
                "Colors",
                "Sports",
                "Music",
                "Movies",
                "Fruit",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room, derived from how many seats are taken.
///
/// ```text
/// WaitingForOpponent ⇄ Active
///         ↓
///       Closed
/// ```
///
/// - **WaitingForOpponent**: one seat taken. Joinable; turns are refused.
/// - **Active**: both seats taken. Turns alternate.
/// - **Closed**: no seats taken. The registry drops the room and its code
///   becomes available again.
///
/// An Active room that loses a player goes back to WaitingForOpponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForOpponent,
    Active,
    Closed,
}

impl RoomState {
    /// Maps a seat count to its state.
    pub fn from_occupancy(seated: usize) -> Self {
        match seated {
            0 => Self::Closed,
            1 => Self::WaitingForOpponent,
            _ => Self::Active,
        }
    }

    /// Returns `true` if the room is accepting a new player.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForOpponent)
    }

    /// Returns `true` if turns may be played.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}
