//! Unified error type for the Wordlink server.

use wordlink_protocol::ProtocolError;
use wordlink_room::RoomError;
use wordlink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordlinkError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error. At server level only configuration problems
    /// surface this way; request errors go back to the client instead.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Bad environment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors reading [`ServerConfig`](crate::ServerConfig) from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}: expected an integer in 0..=65535")]
    InvalidPort(String),
}
