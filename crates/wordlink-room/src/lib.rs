//! Room lifecycle management for Wordlink.
//!
//! A room is a two-seat session identified by a short code. The creator
//! takes seat 0, one joiner takes seat 1, and from then on the seats take
//! turns strictly alternating. Everything here is synchronous and
//! in-memory; callers serialize access to the [`RoomRegistry`] (the server
//! keeps it behind a single mutex) so every operation is one critical
//! section.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates, joins and leaves rooms; routes turns
//! - [`Room`]: one session's seats, category and turn
//! - [`CodeGenerator`]: allocates room codes unique among active rooms
//! - [`RelayInstruction`] / [`EventRelay`]: what to send to whom, and the
//!   seam the transport implements to actually send it
//! - [`RoomState`]: lifecycle state machine
//! - [`RegistryConfig`]: code format, username limits, category catalogue

mod code;
mod config;
mod error;
mod registry;
mod relay;
mod room;

pub use code::CodeGenerator;
pub use config::{DEFAULT_CODE_ALPHABET, RegistryConfig, RoomState};
pub use error::RoomError;
pub use registry::{JoinedRoom, RoomRegistry};
pub use relay::{EventRelay, Recipient, RelayInstruction};
pub use room::{Player, ROOM_CAPACITY, Room, Seat, TurnTaken};
