//! Per-connection handler: outbound writer, inbound event loop, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Finish the WebSocket handshake, bounded by the handshake timeout
//!   2. Register an outbound queue in the hub, spawn its writer task
//!   3. Send `connected` with the connection's id
//!   4. Loop: receive frames → decode → run through the registry → deliver
//!   5. On close (or panic) the guard removes the connection everywhere

use std::sync::Arc;
use std::time::Duration;

use wordlink_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use wordlink_room::{EventRelay, RelayInstruction, RoomError};
use wordlink_transport::{
    Connection, Incoming, PendingWebSocket, TransportError, WebSocketConnection,
};

use crate::WordlinkError;
use crate::server::ServerState;

/// Drop guard that takes the connection out of its room and out of the
/// hub when the handler exits, even by panic. `Drop` is synchronous, so
/// the work runs in a spawned task.
struct DisconnectGuard<C: Codec> {
    connection: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for DisconnectGuard<C> {
    fn drop(&mut self) {
        let connection = self.connection;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut rooms = state.rooms.lock().await;
            if let Some(notice) = rooms.remove_connection(connection) {
                state.hub.deliver(notice);
            }
            state.hub.unregister(connection);
            tracing::debug!(%connection, "connection cleaned up");
        });
    }
}

/// Upgrades a freshly accepted socket and then serves it. A peer that
/// has not finished its handshake within `handshake_timeout` is dropped.
pub(crate) async fn serve_incoming<C: Codec>(
    incoming: PendingWebSocket,
    state: Arc<ServerState<C>>,
    handshake_timeout: Duration,
) -> Result<(), WordlinkError> {
    let connection = incoming.id();
    let conn = match tokio::time::timeout(handshake_timeout, incoming.upgrade()).await {
        Ok(upgraded) => upgraded?,
        Err(_) => {
            tracing::debug!(%connection, "handshake timed out");
            return Err(TransportError::HandshakeTimedOut(handshake_timeout).into());
        }
    };
    handle_connection(conn, state).await
}

/// Handles a single upgraded connection until it closes.
async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), WordlinkError> {
    let connection = conn.id();
    let conn = Arc::new(conn);
    tracing::debug!(%connection, "handling new connection");

    let mut outbox = state.hub.register(connection);
    let _guard = DisconnectGuard {
        connection,
        state: Arc::clone(&state),
    };

    let mut writer = {
        let conn = Arc::clone(&conn);
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = outbox.recv().await {
                let bytes = match state.codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(
                            %connection,
                            error = %e,
                            event = event.name(),
                            "failed to encode event"
                        );
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%connection, error = %e, "send failed, stopping writer");
                    break;
                }
            }
        })
    };

    state.hub.send_to(
        connection,
        ServerEvent::Connected {
            connection_id: connection,
        },
    );

    // The writer also stops when the hub drops an overflowing queue, which
    // ends the connection.
    let result = tokio::select! {
        result = read_events(&conn, &state, connection) => result,
        _ = &mut writer => {
            tracing::debug!(%connection, "writer stopped, closing connection");
            if let Err(e) = conn.close().await {
                tracing::debug!(%connection, error = %e, "close failed");
            }
            Ok(())
        }
    };
    writer.abort();

    // _guard drops here → room and hub cleanup fires.
    result
}

/// Reads frames until the peer goes away. Every frame is handled to
/// completion, deliveries included, before the next one is read.
async fn read_events<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    connection: ConnectionId,
) -> Result<(), WordlinkError> {
    while let Some(data) = conn.recv().await? {
        match state.codec.decode::<ClientEvent>(&data) {
            Ok(event) => {
                tracing::debug!(%connection, event = event.name(), "event received");
                let mut rooms = state.rooms.lock().await;
                let instruction = rooms.handle(connection, event);
                state.hub.deliver(instruction);
            }
            Err(e) => {
                tracing::debug!(%connection, error = %e, "failed to decode event");
                let error = RoomError::Validation(e.to_string());
                state
                    .hub
                    .deliver(RelayInstruction::rejection(connection, &error));
            }
        }
    }

    tracing::info!(%connection, "connection closed");
    Ok(())
}
