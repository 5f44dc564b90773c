//! Outbound routing: who gets which event.
//!
//! Registry operations return a [`RelayInstruction`] instead of sending
//! anything themselves. The server hands the instruction to an
//! [`EventRelay`], which owns the actual per-connection channels.

use wordlink_protocol::{ConnectionId, ServerEvent};

use crate::RoomError;

/// Who should receive an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// One specific connection.
    Connection(ConnectionId),
    /// Every member of a room, listed at the moment the event was produced.
    Room(Vec<ConnectionId>),
}

impl Recipient {
    /// Returns `true` if `connection` is addressed by this recipient.
    pub fn includes(&self, connection: ConnectionId) -> bool {
        match self {
            Self::Connection(id) => *id == connection,
            Self::Room(members) => members.contains(&connection),
        }
    }
}

/// An ordered list of deliveries produced by one registry operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelayInstruction {
    deliveries: Vec<(Recipient, ServerEvent)>,
}

impl RelayInstruction {
    pub fn new() -> Self {
        Self::default()
    }

    /// An instruction with a single delivery to one connection.
    pub fn to_connection(connection: ConnectionId, event: ServerEvent) -> Self {
        Self::new().then_connection(connection, event)
    }

    /// An instruction with a single broadcast to a room's members.
    pub fn to_room(members: Vec<ConnectionId>, event: ServerEvent) -> Self {
        Self::new().then_room(members, event)
    }

    /// Tells the requester why their request was refused.
    pub fn rejection(connection: ConnectionId, error: &RoomError) -> Self {
        Self::to_connection(
            connection,
            ServerEvent::Error {
                reason: error.to_string(),
            },
        )
    }

    pub fn then_connection(mut self, connection: ConnectionId, event: ServerEvent) -> Self {
        self.deliveries
            .push((Recipient::Connection(connection), event));
        self
    }

    pub fn then_room(mut self, members: Vec<ConnectionId>, event: ServerEvent) -> Self {
        self.deliveries.push((Recipient::Room(members), event));
        self
    }

    /// Appends every delivery of `other` after this one's.
    pub fn merge(mut self, other: RelayInstruction) -> Self {
        self.deliveries.extend(other.deliveries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }

    /// Events `connection` would receive, in delivery order.
    pub fn events_for(&self, connection: ConnectionId) -> Vec<&ServerEvent> {
        self.deliveries
            .iter()
            .filter(|(recipient, _)| recipient.includes(connection))
            .map(|(_, event)| event)
            .collect()
    }
}

impl IntoIterator for RelayInstruction {
    type Item = (Recipient, ServerEvent);
    type IntoIter = std::vec::IntoIter<(Recipient, ServerEvent)>;

    fn into_iter(self) -> Self::IntoIter {
        self.deliveries.into_iter()
    }
}

/// Sends events to connections.
///
/// Implementations must not block: `send_to` is called while the registry
/// lock is held, which is what keeps per-connection ordering identical to
/// the order registry operations ran in. Sending to a connection that is
/// already gone is silently ignored.
pub trait EventRelay {
    fn send_to(&self, connection: ConnectionId, event: ServerEvent);

    /// Fans an instruction out, one `send_to` per recipient connection.
    fn deliver(&self, instruction: RelayInstruction) {
        for (recipient, event) in instruction {
            match recipient {
                Recipient::Connection(connection) => self.send_to(connection, event),
                Recipient::Room(members) => {
                    for connection in members {
                        self.send_to(connection, event.clone());
                    }
                }
            }
        }
    }
}
