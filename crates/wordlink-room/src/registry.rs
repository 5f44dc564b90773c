//! Room registry: creates rooms, seats players, and routes turns.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wordlink_protocol::{Category, ClientEvent, ConnectionId, RoomCode, ServerEvent};

use crate::{CodeGenerator, RegistryConfig, RelayInstruction, Room, RoomError};

/// What a successful join produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    pub code: RoomCode,
    pub category: Category,
    /// Connection that moves first.
    pub starter: ConnectionId,
    /// Everyone now seated, in seat order.
    pub members: Vec<ConnectionId>,
}

impl JoinedRoom {
    /// `roomJoined` to the joiner, then `startGame` to both seats.
    pub fn instruction(&self, joiner: ConnectionId) -> RelayInstruction {
        RelayInstruction::to_connection(
            joiner,
            ServerEvent::RoomJoined {
                code: self.code.clone(),
                category: self.category.clone(),
            },
        )
        .then_room(
            self.members.clone(),
            ServerEvent::StartGame {
                category: self.category.clone(),
                starter_connection_id: self.starter,
            },
        )
    }
}

/// Owns every active room and knows which connection sits where.
///
/// Two indexes are kept in lockstep:
/// - `rooms`: code to room. A room is present iff at least one seat is
///   taken, so a code is reusable as soon as its room empties.
/// - `connection_rooms`: connection to code. A connection is in at most
///   one room.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    connection_rooms: HashMap<ConnectionId, RoomCode>,
    codes: CodeGenerator,
    categories: Vec<String>,
    max_username_len: usize,
    rng: StdRng,
}

impl RoomRegistry {
    /// Creates an empty registry seeded from the OS.
    ///
    /// # Errors
    /// `RoomError::EmptyCatalogue` if `config.categories` is empty, or
    /// `RoomError::InvalidCodeFormat` for an unusable code alphabet/length.
    pub fn new(config: RegistryConfig) -> Result<Self, RoomError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty registry whose codes and categories are
    /// reproducible for a given seed.
    pub fn with_seed(config: RegistryConfig, seed: u64) -> Result<Self, RoomError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: RegistryConfig, rng: StdRng) -> Result<Self, RoomError> {
        if config.categories.is_empty() {
            return Err(RoomError::EmptyCatalogue);
        }
        Ok(Self {
            rooms: HashMap::new(),
            connection_rooms: HashMap::new(),
            codes: CodeGenerator::from_config(&config)?,
            categories: config.categories,
            max_username_len: config.max_username_len,
            rng,
        })
    }

    /// Runs one client event and returns everything that must be sent
    /// because of it. Failures become an `error` event for the sender
    /// alone; the registry is unchanged in that case.
    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent) -> RelayInstruction {
        let name = event.name();
        let result = match event {
            ClientEvent::CreateRoom { username } => self
                .create_room(connection, &username)
                .map(|code| {
                    RelayInstruction::to_connection(connection, ServerEvent::RoomCreated { code })
                }),
            ClientEvent::JoinRoom { code, username } => self
                .join_room(connection, &code, &username)
                .map(|joined| joined.instruction(connection)),
            ClientEvent::GameAction { term } => self.handle_action(connection, term),
            ClientEvent::LeaveRoom => self.leave_room(connection),
        };

        result.unwrap_or_else(|error| {
            tracing::debug!(%connection, event = name, %error, "request rejected");
            RelayInstruction::rejection(connection, &error)
        })
    }

    /// Opens a room with `connection` in seat 0 and returns its code.
    pub fn create_room(
        &mut self,
        connection: ConnectionId,
        username: &str,
    ) -> Result<RoomCode, RoomError> {
        let username = self.validate_username(username)?;
        self.ensure_unseated(connection)?;

        let rooms = &self.rooms;
        let code = self
            .codes
            .generate(&mut self.rng, |candidate| rooms.contains_key(candidate));
        let category = self.draw_category();

        tracing::info!(%code, %connection, category = %category.name, "room created");
        self.rooms.insert(
            code.clone(),
            Room::open(code.clone(), category, connection, username),
        );
        self.connection_rooms.insert(connection, code.clone());
        Ok(code)
    }

    /// Seats `connection` in the room with `code` (case-insensitive) and
    /// starts the game.
    pub fn join_room(
        &mut self,
        connection: ConnectionId,
        code: &str,
        username: &str,
    ) -> Result<JoinedRoom, RoomError> {
        let code = RoomCode::normalize(code);
        if code.is_empty() {
            return Err(RoomError::Validation("room code must not be empty".into()));
        }
        let username = self.validate_username(username)?;
        self.ensure_unseated(connection)?;

        let room = self
            .rooms
            .get_mut(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let starter = room.seat_joiner(connection, username)?;

        let joined = JoinedRoom {
            code: code.clone(),
            category: room.category().clone(),
            starter,
            members: room.connections(),
        };
        self.connection_rooms.insert(connection, code);
        tracing::info!(code = %joined.code, %connection, "player joined room");
        Ok(joined)
    }

    /// Accepts a move from the turn holder and broadcasts it to the room.
    /// `term` is relayed untouched.
    pub fn handle_action(
        &mut self,
        connection: ConnectionId,
        term: serde_json::Value,
    ) -> Result<RelayInstruction, RoomError> {
        let code = self
            .connection_rooms
            .get(&connection)
            .ok_or(RoomError::NotSeated)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let turn = room.take_turn(connection)?;
        tracing::debug!(%code, %connection, next = %turn.next, "turn played");

        Ok(RelayInstruction::to_room(
            room.connections(),
            ServerEvent::OpponentAction {
                username: turn.username,
                term,
                next_player_connection_id: turn.next,
            },
        ))
    }

    /// Takes `connection` out of its room but keeps the connection open.
    /// The leaver gets `roomLeft`; a remaining player is notified.
    pub fn leave_room(&mut self, connection: ConnectionId) -> Result<RelayInstruction, RoomError> {
        let (code, notice) = self.detach(connection).ok_or(RoomError::NotSeated)?;
        let ack = RelayInstruction::to_connection(connection, ServerEvent::RoomLeft { code });
        Ok(match notice {
            Some(notice) => ack.merge(notice),
            None => ack,
        })
    }

    /// Forgets `connection` after its transport closed.
    ///
    /// Returns the notice for the remaining player, if there is one.
    /// Unknown connections are a no-op.
    pub fn remove_connection(&mut self, connection: ConnectionId) -> Option<RelayInstruction> {
        self.detach(connection).and_then(|(_, notice)| notice)
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// The room `connection` is seated in, if any.
    pub fn room_of(&self, connection: ConnectionId) -> Option<&Room> {
        self.connection_rooms
            .get(&connection)
            .and_then(|code| self.rooms.get(code))
    }

    pub fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.contains_key(code)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn validate_username(&self, raw: &str) -> Result<String, RoomError> {
        let username = raw.trim();
        if username.is_empty() {
            return Err(RoomError::Validation("username must not be empty".into()));
        }
        if username.chars().count() > self.max_username_len {
            return Err(RoomError::Validation(format!(
                "username longer than {} characters",
                self.max_username_len
            )));
        }
        Ok(username.to_string())
    }

    fn ensure_unseated(&self, connection: ConnectionId) -> Result<(), RoomError> {
        match self.connection_rooms.get(&connection) {
            Some(code) => Err(RoomError::AlreadySeated(code.clone())),
            None => Ok(()),
        }
    }

    fn draw_category(&mut self) -> Category {
        let index = self.rng.random_range(0..self.categories.len());
        Category {
            index,
            name: self.categories[index].clone(),
        }
    }

    /// Unseats `connection` and closes the room if it is now empty.
    ///
    /// Returns the room code and the notice for whoever is left.
    fn detach(
        &mut self,
        connection: ConnectionId,
    ) -> Option<(RoomCode, Option<RelayInstruction>)> {
        let code = self.connection_rooms.remove(&connection)?;
        let Some(room) = self.rooms.get_mut(&code) else {
            tracing::warn!(%code, %connection, "connection indexed to a missing room");
            return Some((code, None));
        };

        let departed = room.unseat(connection);
        let survivor = room.players().first().map(|p| p.connection);

        let notice = match (departed, survivor) {
            (Some(departed), Some(survivor)) => {
                tracing::info!(%code, %connection, "player left room");
                Some(RelayInstruction::to_connection(
                    survivor,
                    ServerEvent::PlayerDisconnected {
                        username: departed.username,
                    },
                ))
            }
            (_, None) => {
                self.rooms.remove(&code);
                tracing::info!(%code, "room closed");
                None
            }
            (None, Some(_)) => {
                tracing::warn!(%code, %connection, "connection was not seated in its room");
                None
            }
        };
        Some((code, notice))
    }
}
