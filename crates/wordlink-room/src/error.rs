//! Error types for the room layer.

use wordlink_protocol::RoomCode;

/// Errors that can occur during room operations.
///
/// The `Display` text of every request-level variant doubles as the
/// `reason` sent back to the client in an `error` event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// A required field is missing, empty, or malformed.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No active room has this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The acting connection is not seated in any room.
    #[error("not in a room")]
    NotSeated,

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The acting connection does not hold the turn.
    #[error("not your turn")]
    TurnViolation,

    /// A turn was played while the second seat is empty.
    #[error("waiting for an opponent")]
    OpponentMissing,

    /// The connection already sits in a room.
    #[error("already in room {0}")]
    AlreadySeated(RoomCode),

    /// The registry was configured without any categories.
    #[error("category catalogue is empty")]
    EmptyCatalogue,

    /// The room code alphabet or length is unusable.
    #[error("invalid room code format: {0}")]
    InvalidCodeFormat(String),
}
