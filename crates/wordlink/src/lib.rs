//! # Wordlink
//!
//! Room coordinator for two-player, turn-based word-association games.
//!
//! A player opens a room and gets a short code; a second player joins with
//! that code; the server then relays each player's move to both seats and
//! enforces strict turn alternation. The server never inspects the moves
//! themselves.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordlink::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), WordlinkError> {
//!     let config = ServerConfig::from_env()?;
//!     let server = WordlinkServerBuilder::from_config(&config).build().await?;
//!     server.run().await
//! }
//! ```

mod config;
mod error;
mod handler;
mod hub;
mod server;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig};
pub use error::{ConfigError, WordlinkError};
pub use server::{DEFAULT_HANDSHAKE_TIMEOUT, WordlinkServer, WordlinkServerBuilder};

pub mod prelude {
    pub use crate::{
        ConfigError, ServerConfig, WordlinkError, WordlinkServer, WordlinkServerBuilder,
    };
    pub use wordlink_protocol::{
        Category, ClientEvent, Codec, ConnectionId, JsonCodec, RoomCode, ServerEvent,
    };
    pub use wordlink_room::{RegistryConfig, RoomError};
}
