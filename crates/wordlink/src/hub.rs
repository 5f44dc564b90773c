//! Live connections and their outbound queues.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use wordlink_protocol::{ConnectionId, ServerEvent};
use wordlink_room::EventRelay;

/// Events a connection may have queued before it is dropped as too slow.
pub(crate) const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Maps each live connection to the sending half of its outbound queue.
///
/// A per-connection writer task owns the receiving half and does the
/// socket I/O, so pushing an event here never waits on the network. A
/// queue that fills up is removed from the hub; its writer then drains
/// what is left and stops, which ends the connection.
pub(crate) struct ConnectionHub {
    senders: RwLock<HashMap<ConnectionId, mpsc::Sender<ServerEvent>>>,
    capacity: usize,
}

impl ConnectionHub {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Opens an outbound queue for `connection`.
    pub(crate) fn register(&self, connection: ConnectionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection, tx);
        rx
    }

    pub(crate) fn unregister(&self, connection: ConnectionId) {
        self.senders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&connection);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.senders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventRelay for ConnectionHub {
    fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        let overflowed = {
            let senders = self.senders.read().unwrap_or_else(PoisonError::into_inner);
            match senders.get(&connection) {
                Some(tx) => match tx.try_send(event) {
                    Ok(()) => false,
                    Err(TrySendError::Full(_)) => true,
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!(%connection, "outbound queue closed, dropping event");
                        false
                    }
                },
                None => {
                    tracing::debug!(%connection, "no such connection, dropping event");
                    false
                }
            }
        };

        if overflowed {
            tracing::warn!(
                %connection,
                capacity = self.capacity,
                "outbound queue full, dropping connection"
            );
            self.unregister(connection);
        }
    }
}

#[cfg(test)]
mod tests {
    use wordlink_protocol::RoomCode;
    use wordlink_room::RelayInstruction;

    use super::*;

    fn created(code: &str) -> ServerEvent {
        ServerEvent::RoomCreated {
            code: RoomCode::normalize(code),
        }
    }

    #[test]
    fn test_send_to_registered_connection() {
        let hub = ConnectionHub::new(DEFAULT_OUTBOUND_CAPACITY);
        let conn = ConnectionId::new(1);
        let mut rx = hub.register(conn);

        hub.send_to(conn, created("ABCD"));

        assert_eq!(rx.try_recv().unwrap(), created("ABCD"));
    }

    #[test]
    fn test_send_to_unknown_connection_is_ignored() {
        let hub = ConnectionHub::new(DEFAULT_OUTBOUND_CAPACITY);
        hub.send_to(ConnectionId::new(99), created("ABCD"));
        assert_eq!(hub.len(), 0);
    }

    #[test]
    fn test_deliver_room_broadcast_reaches_every_member() {
        let hub = ConnectionHub::new(DEFAULT_OUTBOUND_CAPACITY);
        let (a, b) = (ConnectionId::new(1), ConnectionId::new(2));
        let mut rx_a = hub.register(a);
        let mut rx_b = hub.register(b);

        hub.deliver(RelayInstruction::to_room(vec![a, b], created("WXYZ")));

        assert_eq!(rx_a.try_recv().unwrap(), created("WXYZ"));
        assert_eq!(rx_b.try_recv().unwrap(), created("WXYZ"));
    }

    #[test]
    fn test_unregister_closes_queue() {
        let hub = ConnectionHub::new(DEFAULT_OUTBOUND_CAPACITY);
        let conn = ConnectionId::new(1);
        let mut rx = hub.register(conn);

        hub.unregister(conn);
        hub.send_to(conn, created("ABCD"));

        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert_eq!(hub.len(), 0);
    }

    #[test]
    fn test_full_queue_drops_connection_after_draining() {
        let hub = ConnectionHub::new(2);
        let slow = ConnectionId::new(1);
        let other = ConnectionId::new(2);
        let mut rx_slow = hub.register(slow);
        let mut rx_other = hub.register(other);

        hub.send_to(slow, created("AAAA"));
        hub.send_to(slow, created("BBBB"));
        hub.send_to(slow, created("CCCC"));

        // Queued events still reach the writer, then the queue is closed.
        assert_eq!(rx_slow.try_recv().unwrap(), created("AAAA"));
        assert_eq!(rx_slow.try_recv().unwrap(), created("BBBB"));
        assert!(matches!(
            rx_slow.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));

        // Other connections are untouched.
        hub.send_to(other, created("DDDD"));
        assert_eq!(rx_other.try_recv().unwrap(), created("DDDD"));
        assert_eq!(hub.len(), 1);
    }
}
