//! Integration tests for the room system, driven through `RoomRegistry::handle`
//! and delivered through an in-memory relay the way the server does it.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;
use wordlink_protocol::{ClientEvent, ConnectionId, RoomCode, ServerEvent};
use wordlink_room::{EventRelay, RegistryConfig, RoomRegistry, RoomState, Seat};

// =========================================================================
// Test relay: one inbox per connection.
// =========================================================================

#[derive(Default)]
struct Inboxes {
    inner: Mutex<HashMap<ConnectionId, Vec<ServerEvent>>>,
}

impl EventRelay for Inboxes {
    fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        self.inner
            .lock()
            .unwrap()
            .entry(connection)
            .or_default()
            .push(event);
    }
}

impl Inboxes {
    /// Drains everything delivered to `connection` so far.
    fn take(&self, connection: ConnectionId) -> Vec<ServerEvent> {
        self.inner
            .lock()
            .unwrap()
            .remove(&connection)
            .unwrap_or_default()
    }
}

struct Table {
    registry: RoomRegistry,
    relay: Inboxes,
}

impl Table {
    fn new(config: RegistryConfig) -> Self {
        Self {
            registry: RoomRegistry::with_seed(config, 2024).unwrap(),
            relay: Inboxes::default(),
        }
    }

    fn send(&mut self, connection: ConnectionId, event: ClientEvent) {
        let instruction = self.registry.handle(connection, event);
        self.relay.deliver(instruction);
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        if let Some(notice) = self.registry.remove_connection(connection) {
            self.relay.deliver(notice);
        }
    }
}

fn create(username: &str) -> ClientEvent {
    ClientEvent::CreateRoom {
        username: username.into(),
    }
}

fn join(code: &str, username: &str) -> ClientEvent {
    ClientEvent::JoinRoom {
        code: code.into(),
        username: username.into(),
    }
}

fn action(term: serde_json::Value) -> ClientEvent {
    ClientEvent::GameAction { term }
}

fn created_code(events: &[ServerEvent]) -> RoomCode {
    match events {
        [ServerEvent::RoomCreated { code }] => code.clone(),
        other => panic!("expected a single roomCreated, got {other:?}"),
    }
}

fn error(reason: &str) -> ServerEvent {
    ServerEvent::Error {
        reason: reason.into(),
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_full_session_ana_and_ben() {
    let ana = ConnectionId::new(1);
    let ben = ConnectionId::new(2);
    let mut table = Table::new(RegistryConfig::default());

    // Ana opens a room.
    table.send(ana, create("Ana"));
    let code = created_code(&table.relay.take(ana));
    assert_eq!(code.as_str().len(), 4);

    // Ben joins with the code typed in lowercase.
    table.send(ben, join(&code.as_str().to_lowercase(), "Ben"));
    let to_ben = table.relay.take(ben);
    let to_ana = table.relay.take(ana);

    let category = match &to_ben[..] {
        [
            ServerEvent::RoomJoined {
                code: joined,
                category,
            },
            ServerEvent::StartGame {
                category: started,
                starter_connection_id,
            },
        ] => {
            assert_eq!(joined, &code);
            assert_eq!(started, category);
            assert_eq!(*starter_connection_id, ana);
            category.clone()
        }
        other => panic!("unexpected events for Ben: {other:?}"),
    };
    assert_eq!(
        to_ana,
        vec![ServerEvent::StartGame {
            category,
            starter_connection_id: ana,
        }]
    );

    // Ben moves out of turn.
    table.send(ben, action(json!("apple")));
    assert_eq!(table.relay.take(ben), vec![error("not your turn")]);
    assert!(table.relay.take(ana).is_empty());

    // Ana plays; both seats see it and the turn passes to Ben.
    table.send(ana, action(json!("lemon")));
    let expected = ServerEvent::OpponentAction {
        username: "Ana".into(),
        term: json!("lemon"),
        next_player_connection_id: ben,
    };
    assert_eq!(table.relay.take(ana), vec![expected.clone()]);
    assert_eq!(table.relay.take(ben), vec![expected]);

    // Ben answers.
    table.send(ben, action(json!({"word": "lime"})));
    assert!(matches!(
        &table.relay.take(ana)[..],
        [ServerEvent::OpponentAction { username, next_player_connection_id, .. }]
            if username == "Ben" && *next_player_connection_id == ana
    ));
    table.relay.take(ben);

    // Ana drops; Ben is told and the room waits for a new opponent.
    table.disconnect(ana);
    assert_eq!(
        table.relay.take(ben),
        vec![ServerEvent::PlayerDisconnected {
            username: "Ana".into()
        }]
    );
    assert_eq!(
        table.registry.room(&code).map(|r| r.state()),
        Some(RoomState::WaitingForOpponent)
    );

    // Ben drops; the room is gone.
    table.disconnect(ben);
    assert!(!table.registry.contains(&code));
    assert_eq!(table.registry.room_count(), 0);
}

#[test]
fn test_third_player_is_refused() {
    let mut table = Table::new(RegistryConfig::default());
    let (ana, ben, cy) = (
        ConnectionId::new(1),
        ConnectionId::new(2),
        ConnectionId::new(3),
    );

    table.send(ana, create("Ana"));
    let code = created_code(&table.relay.take(ana));
    table.send(ben, join(code.as_str(), "Ben"));
    table.relay.take(ana);
    table.relay.take(ben);

    table.send(cy, join(code.as_str(), "Cy"));

    assert_eq!(
        table.relay.take(cy),
        vec![error(&format!("room {code} is full"))]
    );
    assert!(table.relay.take(ana).is_empty());
    assert!(table.relay.take(ben).is_empty());
}

#[test]
fn test_join_unknown_room_reports_not_found() {
    let mut table = Table::new(RegistryConfig::default());
    let ben = ConnectionId::new(2);

    table.send(ben, join("q9q9", "Ben"));

    assert_eq!(table.relay.take(ben), vec![error("room Q9Q9 not found")]);
    assert_eq!(table.registry.room_count(), 0);
}

#[test]
fn test_join_unknown_room_leaves_waiting_room_untouched() {
    let mut table = Table::new(RegistryConfig::default());
    let (ana, ben) = (ConnectionId::new(1), ConnectionId::new(2));

    table.send(ana, create("Ana"));
    let code = created_code(&table.relay.take(ana));
    let before = table.registry.room(&code).unwrap().players().to_vec();

    // Five characters, so it can never match a freshly generated code.
    table.send(ben, join("zzzzz", "Ben"));

    assert_eq!(table.relay.take(ben), vec![error("room ZZZZZ not found")]);
    assert!(table.relay.take(ana).is_empty());
    assert!(table.registry.room_of(ben).is_none());

    let room = table.registry.room(&code).unwrap();
    assert_eq!(room.players(), &before[..]);
    assert_eq!(room.state(), RoomState::WaitingForOpponent);
    assert_eq!(room.current_turn(), Seat::Creator);
    assert_eq!(table.registry.room_count(), 1);
}

#[test]
fn test_replacement_opponent_gets_fresh_start() {
    let mut table = Table::new(RegistryConfig::default());
    let (ana, ben, cy) = (
        ConnectionId::new(1),
        ConnectionId::new(2),
        ConnectionId::new(3),
    );

    table.send(ana, create("Ana"));
    let code = created_code(&table.relay.take(ana));
    table.send(ben, join(code.as_str(), "Ben"));
    table.send(ana, action(json!("lemon")));
    table.disconnect(ana);
    table.relay.take(ben);

    table.send(cy, join(code.as_str(), "Cy"));

    // Ben now holds seat 0 and starts the new game.
    assert!(matches!(
        &table.relay.take(ben)[..],
        [ServerEvent::StartGame { starter_connection_id, .. }] if *starter_connection_id == ben
    ));
    table.send(ben, action(json!("pear")));
    assert!(matches!(
        &table.relay.take(cy)[..],
        [_, _, ServerEvent::OpponentAction { next_player_connection_id, .. }]
            if *next_player_connection_id == cy
    ));
}

#[test]
fn test_room_code_reusable_after_room_closes() {
    // A one-symbol alphabet makes the code space tiny: the first room gets
    // "A", a concurrent one must widen to "AA".
    let config = RegistryConfig {
        code_alphabet: "A".into(),
        code_length: 1,
        max_code_attempts: 4,
        ..RegistryConfig::default()
    };
    let mut table = Table::new(config);
    let (ana, ben, cy) = (
        ConnectionId::new(1),
        ConnectionId::new(2),
        ConnectionId::new(3),
    );

    table.send(ana, create("Ana"));
    let first = created_code(&table.relay.take(ana));
    assert_eq!(first.as_str(), "A");

    table.send(ben, create("Ben"));
    assert_eq!(created_code(&table.relay.take(ben)).as_str(), "AA");

    table.disconnect(ana);
    assert!(!table.registry.contains(&first));

    table.send(cy, create("Cy"));
    assert_eq!(created_code(&table.relay.take(cy)), first);
}

#[test]
fn test_seeded_registries_agree_on_codes() {
    let mut a = Table::new(RegistryConfig::default());
    let mut b = Table::new(RegistryConfig::default());
    let conn = ConnectionId::new(1);

    a.send(conn, create("Ana"));
    b.send(conn, create("Ana"));

    assert_eq!(
        created_code(&a.relay.take(conn)),
        created_code(&b.relay.take(conn))
    );
}

#[test]
fn test_leave_then_create_new_room() {
    let mut table = Table::new(RegistryConfig::default());
    let ana = ConnectionId::new(1);

    table.send(ana, create("Ana"));
    let first = created_code(&table.relay.take(ana));

    table.send(ana, ClientEvent::LeaveRoom);
    assert_eq!(
        table.relay.take(ana),
        vec![ServerEvent::RoomLeft {
            code: first.clone()
        }]
    );
    assert!(!table.registry.contains(&first));

    table.send(ana, create("Ana"));
    let second = created_code(&table.relay.take(ana));
    assert!(table.registry.contains(&second));
}

#[test]
fn test_create_while_seated_reports_already_in_room() {
    let mut table = Table::new(RegistryConfig::default());
    let ana = ConnectionId::new(1);

    table.send(ana, create("Ana"));
    let code = created_code(&table.relay.take(ana));
    table.send(ana, create("Ana"));

    assert_eq!(
        table.relay.take(ana),
        vec![error(&format!("already in room {code}"))]
    );
    assert_eq!(table.registry.room_count(), 1);
}
