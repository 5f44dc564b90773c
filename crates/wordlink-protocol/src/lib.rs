//! Wire protocol for Wordlink.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomCode`],
//!   [`Category`]): the named events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the room
//! layer. It knows nothing about rooms or turns, only how to read and
//! write events:
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Room registry → ServerEvent
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{Category, ClientEvent, RoomCode, ServerEvent};
pub use wordlink_transport::ConnectionId;
