//! Event types for Wordlink's wire format.
//!
//! Every frame is one JSON object naming the event and carrying its
//! payload under `data`:
//!
//! ```text
//! {"event": "joinRoom", "data": {"code": "K7QZ", "username": "Ben"}}
//! ```
//!
//! Inbound frames decode into [`ClientEvent`]; anything that does not match
//! one of its variants exactly (unknown event, missing field, wrong type) is
//! rejected at decode time, before it reaches the room layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use wordlink_transport::ConnectionId;

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// The short, human-typeable code that identifies an active room.
///
/// Codes are always stored uppercase. Use [`RoomCode::normalize`] on
/// anything a user typed before looking a room up.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Trims surrounding whitespace and uppercases the input.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code has no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The word-association category a room plays with.
///
/// Picked once when the room is created. `index` is the position in the
/// server's catalogue; `name` is what clients display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub index: usize,
    pub name: String,
}

// ---------------------------------------------------------------------------
// ClientEvent
// ---------------------------------------------------------------------------

/// Events a client may send.
///
/// The connection that sent the event is never part of the payload; the
/// gateway tags each event with the connection it arrived on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room and take seat 0.
    CreateRoom { username: String },

    /// Take seat 1 in the room with this code (case-insensitive).
    JoinRoom { code: String, username: String },

    /// Play a turn. `term` is relayed as-is and never inspected.
    GameAction { term: serde_json::Value },

    /// Leave the current room without closing the connection.
    LeaveRoom,
}

impl ClientEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::GameAction { .. } => "gameAction",
            Self::LeaveRoom => "leaveRoom",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Sent once, right after the socket is accepted.
    Connected { connection_id: ConnectionId },

    /// Reply to `createRoom`.
    RoomCreated { code: RoomCode },

    /// Reply to a successful `joinRoom`, sent to the joiner only.
    RoomJoined { code: RoomCode, category: Category },

    /// Broadcast to both seats once the room is full.
    StartGame {
        category: Category,
        starter_connection_id: ConnectionId,
    },

    /// Broadcast to both seats after an accepted `gameAction`.
    OpponentAction {
        username: String,
        term: serde_json::Value,
        next_player_connection_id: ConnectionId,
    },

    /// Sent to the remaining seat when the other player leaves.
    PlayerDisconnected { username: String },

    /// Reply to `leaveRoom`.
    RoomLeft { code: RoomCode },

    /// A request was rejected. Only ever sent to the requester.
    Error { reason: String },
}

impl ServerEvent {
    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::RoomCreated { .. } => "roomCreated",
            Self::RoomJoined { .. } => "roomJoined",
            Self::StartGame { .. } => "startGame",
            Self::OpponentAction { .. } => "opponentAction",
            Self::PlayerDisconnected { .. } => "playerDisconnected",
            Self::RoomLeft { .. } => "roomLeft",
            Self::Error { .. } => "error",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
