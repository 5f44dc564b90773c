//! A single room: two seats, one category, one turn.
//!
//! The room itself is plain data plus the turn rules. It never talks to the
//! network; the registry turns its results into relay instructions.

use std::fmt;

use wordlink_protocol::{Category, ConnectionId, RoomCode};

use crate::{RoomError, RoomState};

/// Seats per room.
pub const ROOM_CAPACITY: usize = 2;

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// A position at the table. The creator always holds seat 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    Creator,
    Joiner,
}

impl Seat {
    /// The seat's index into the room's player list.
    pub fn index(self) -> usize {
        match self {
            Self::Creator => 0,
            Self::Joiner => 1,
        }
    }

    /// The seat across the table.
    pub fn other(self) -> Self {
        match self {
            Self::Creator => Self::Joiner,
            Self::Joiner => Self::Creator,
        }
    }

    fn at(index: usize) -> Self {
        if index == 0 { Self::Creator } else { Self::Joiner }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seat {}", self.index())
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Someone sitting in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub connection: ConnectionId,
    pub username: String,
    pub seat: Seat,
}

/// Outcome of an accepted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTaken {
    /// Username of the player who just played.
    pub username: String,
    /// Connection that now holds the turn.
    pub next: ConnectionId,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// A two-seat game room.
///
/// `players` is ordered by seat: index 0 is always the creator (or the
/// survivor after the creator left). The turn only means anything while
/// the room is [`RoomState::Active`].
#[derive(Debug, Clone)]
pub struct Room {
    code: RoomCode,
    category: Category,
    players: Vec<Player>,
    turn: Seat,
}

impl Room {
    pub(crate) fn open(
        code: RoomCode,
        category: Category,
        creator: ConnectionId,
        username: String,
    ) -> Self {
        Self {
            code,
            category,
            players: vec![Player {
                connection: creator,
                username,
                seat: Seat::Creator,
            }],
            turn: Seat::Creator,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Seated players in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn state(&self) -> RoomState {
        RoomState::from_occupancy(self.players.len())
    }

    /// The seat whose move it is.
    pub fn current_turn(&self) -> Seat {
        self.turn
    }

    /// The player whose move it is, if the game is running.
    pub fn turn_holder(&self) -> Option<&Player> {
        if self.state().is_active() {
            self.players.get(self.turn.index())
        } else {
            None
        }
    }

    /// Connections of everyone seated, in seat order.
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.players.iter().map(|p| p.connection).collect()
    }

    /// Seats a second player and starts the game with the creator to
    /// move. Returns the starter's connection.
    pub(crate) fn seat_joiner(
        &mut self,
        connection: ConnectionId,
        username: String,
    ) -> Result<ConnectionId, RoomError> {
        if !self.state().is_joinable() {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        self.players.push(Player {
            connection,
            username,
            seat: Seat::at(self.players.len()),
        });
        self.turn = Seat::Creator;

        let starter = self.players[Seat::Creator.index()].connection;
        tracing::info!(code = %self.code, %starter, "game started");
        Ok(starter)
    }

    /// Accepts a move from `connection` if it holds the turn, and passes
    /// the turn to the other seat.
    pub(crate) fn take_turn(&mut self, connection: ConnectionId) -> Result<TurnTaken, RoomError> {
        let holder = self.turn_holder().ok_or(RoomError::OpponentMissing)?;
        if holder.connection != connection {
            return Err(RoomError::TurnViolation);
        }

        let username = holder.username.clone();
        self.turn = self.turn.other();
        let next = self.players[self.turn.index()].connection;
        Ok(TurnTaken { username, next })
    }

    /// Removes `connection` from its seat.
    ///
    /// A survivor moves to seat 0 and the turn resets, so the room is
    /// ready for a fresh opponent.
    pub(crate) fn unseat(&mut self, connection: ConnectionId) -> Option<Player> {
        let position = self
            .players
            .iter()
            .position(|p| p.connection == connection)?;
        let departed = self.players.remove(position);

        for (index, player) in self.players.iter_mut().enumerate() {
            player.seat = Seat::at(index);
        }
        self.turn = Seat::Creator;
        Some(departed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::new(n)
    }

    fn waiting_room() -> Room {
        Room::open(
            RoomCode::normalize("K7QZ"),
            Category {
                index: 0,
                name: "Animals".into(),
            },
            conn(1),
            "Ana".into(),
        )
    }

    fn active_room() -> Room {
        let mut room = waiting_room();
        room.seat_joiner(conn(2), "Ben".into()).unwrap();
        room
    }

    #[test]
    fn test_seat_other_and_index() {
        assert_eq!(Seat::Creator.other(), Seat::Joiner);
        assert_eq!(Seat::Joiner.other(), Seat::Creator);
        assert_eq!(Seat::Creator.index(), 0);
        assert_eq!(Seat::Joiner.index(), 1);
        assert_eq!(Seat::Joiner.to_string(), "seat 1");
    }

    #[test]
    fn test_open_room_is_waiting_with_creator_in_seat_zero() {
        let room = waiting_room();
        assert_eq!(room.state(), RoomState::WaitingForOpponent);
        assert_eq!(room.players()[0].seat, Seat::Creator);
        assert_eq!(room.turn_holder(), None);
    }

    #[test]
    fn test_seat_joiner_activates_and_creator_starts() {
        let mut room = waiting_room();
        let starter = room.seat_joiner(conn(2), "Ben".into()).unwrap();

        assert_eq!(starter, conn(1));
        assert_eq!(room.state(), RoomState::Active);
        assert_eq!(room.players()[1].seat, Seat::Joiner);
        assert_eq!(room.connections(), vec![conn(1), conn(2)]);
    }

    #[test]
    fn test_seat_joiner_third_player_room_full() {
        let mut room = active_room();
        let result = room.seat_joiner(conn(3), "Cy".into());

        assert_eq!(result, Err(RoomError::RoomFull(RoomCode::normalize("K7QZ"))));
        assert_eq!(room.players().len(), ROOM_CAPACITY);
    }

    #[test]
    fn test_take_turn_alternates() {
        let mut room = active_room();

        let first = room.take_turn(conn(1)).unwrap();
        assert_eq!(first.username, "Ana");
        assert_eq!(first.next, conn(2));

        let second = room.take_turn(conn(2)).unwrap();
        assert_eq!(second.username, "Ben");
        assert_eq!(second.next, conn(1));
        assert_eq!(room.current_turn(), Seat::Creator);
    }

    #[test]
    fn test_take_turn_out_of_turn_leaves_turn_unchanged() {
        let mut room = active_room();

        assert_eq!(room.take_turn(conn(2)), Err(RoomError::TurnViolation));
        assert_eq!(room.current_turn(), Seat::Creator);
    }

    #[test]
    fn test_take_turn_without_opponent_rejected() {
        let mut room = waiting_room();
        assert_eq!(room.take_turn(conn(1)), Err(RoomError::OpponentMissing));
    }

    #[test]
    fn test_unseat_creator_moves_survivor_to_seat_zero() {
        let mut room = active_room();
        room.take_turn(conn(1)).unwrap();

        let departed = room.unseat(conn(1)).unwrap();

        assert_eq!(departed.username, "Ana");
        assert_eq!(room.state(), RoomState::WaitingForOpponent);
        assert_eq!(room.players()[0].connection, conn(2));
        assert_eq!(room.players()[0].seat, Seat::Creator);
        assert_eq!(room.current_turn(), Seat::Creator);
    }

    #[test]
    fn test_unseat_then_rejoin_survivor_starts() {
        let mut room = active_room();
        room.unseat(conn(1));

        let starter = room.seat_joiner(conn(3), "Cy".into()).unwrap();
        assert_eq!(starter, conn(2));
    }

    #[test]
    fn test_unseat_unknown_connection_is_none() {
        let mut room = waiting_room();
        assert_eq!(room.unseat(conn(9)), None);
        assert_eq!(room.players().len(), 1);
    }
}
