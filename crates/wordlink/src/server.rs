//! `WordlinkServer` builder and server loop.
//!
//! This is the entry point for running a Wordlink server. It ties the
//! layers together: transport → protocol → room registry → hub.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use wordlink_protocol::{Codec, JsonCodec};
use wordlink_room::{RegistryConfig, RoomRegistry};
use wordlink_transport::{Transport, WebSocketTransport};

use crate::handler::serve_incoming;
use crate::hub::{ConnectionHub, DEFAULT_OUTBOUND_CAPACITY};
use crate::{ServerConfig, WordlinkError};

/// How long a new socket may take to finish its WebSocket handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
///
/// Lock order: `rooms` first, then the hub's internal lock. Deliveries
/// happen while `rooms` is held so every connection sees events in the
/// order the registry produced them.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) hub: ConnectionHub,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Wordlink server.
///
/// # Example
///
/// ```rust,no_run
/// use wordlink::prelude::*;
///
/// # async fn start() -> Result<(), WordlinkError> {
/// let server = WordlinkServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct WordlinkServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
    seed: Option<u64>,
    handshake_timeout: Duration,
    outbound_capacity: usize,
}

impl WordlinkServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            registry_config: RegistryConfig::default(),
            seed: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    /// Starts from a loaded [`ServerConfig`].
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new()
            .bind(&config.bind_addr())
            .registry_config(config.registry.clone())
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Makes room codes and category picks deterministic.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets how long a new socket may take to finish its handshake
    /// before it is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Sets how many events may wait for one slow client before that
    /// client is disconnected.
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Validates the registry config, binds the listener, and returns a
    /// server ready to [`run`](WordlinkServer::run).
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<WordlinkServer<JsonCodec>, WordlinkError> {
        let registry = match self.seed {
            Some(seed) => RoomRegistry::with_seed(self.registry_config, seed)?,
            None => RoomRegistry::new(self.registry_config)?,
        };

        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(registry),
            hub: ConnectionHub::new(self.outbound_capacity),
            codec: JsonCodec,
        });

        Ok(WordlinkServer {
            transport,
            state,
            handshake_timeout: self.handshake_timeout,
        })
    }
}

impl Default for WordlinkServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Wordlink server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct WordlinkServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    handshake_timeout: Duration,
}

impl WordlinkServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> WordlinkServerBuilder {
        WordlinkServerBuilder::new()
    }
}

impl<C: Codec> WordlinkServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, WordlinkError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// The handshake happens on that task, never on the loop itself.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WordlinkError> {
        tracing::info!("Wordlink server running");

        loop {
            match self.transport.accept().await {
                Ok(incoming) => {
                    let state = Arc::clone(&self.state);
                    let handshake_timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        if let Err(e) = serve_incoming(incoming, state, handshake_timeout).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
