//! Room code allocation.

use rand::Rng;
use wordlink_protocol::RoomCode;

use crate::{RegistryConfig, RoomError};

/// Draws random room codes that do not collide with any active room.
///
/// Codes are `length` characters drawn uniformly from the alphabet. If
/// `max_attempts` draws in a row all collide, the generator widens the
/// code by one character and keeps going, so it always terminates while
/// the set of active rooms is finite.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
    max_attempts: u32,
}

impl CodeGenerator {
    /// Builds a generator, folding the alphabet to uppercase and dropping
    /// duplicate characters.
    ///
    /// # Errors
    /// `RoomError::InvalidCodeFormat` if the alphabet is empty or holds a
    /// character that is not ASCII alphanumeric, or if `length` is zero.
    pub fn new(alphabet: &str, length: usize, max_attempts: u32) -> Result<Self, RoomError> {
        if length == 0 {
            return Err(RoomError::InvalidCodeFormat(
                "code length must be at least 1".into(),
            ));
        }

        let mut symbols = Vec::new();
        for c in alphabet.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(RoomError::InvalidCodeFormat(format!(
                    "alphabet character {c:?} is not alphanumeric"
                )));
            }
            let c = c.to_ascii_uppercase();
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }
        if symbols.is_empty() {
            return Err(RoomError::InvalidCodeFormat("alphabet is empty".into()));
        }

        Ok(Self {
            alphabet: symbols,
            length,
            max_attempts: max_attempts.max(1),
        })
    }

    /// Builds a generator from the code settings in `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RoomError> {
        Self::new(
            &config.code_alphabet,
            config.code_length,
            config.max_code_attempts,
        )
    }

    /// Returns a code for which `is_taken` is false.
    pub fn generate<R, F>(&self, rng: &mut R, is_taken: F) -> RoomCode
    where
        R: Rng + ?Sized,
        F: Fn(&RoomCode) -> bool,
    {
        let mut length = self.length;
        loop {
            for _ in 0..self.max_attempts {
                let candidate = self.draw(rng, length);
                if !is_taken(&candidate) {
                    return candidate;
                }
            }
            tracing::warn!(length, "room code space crowded, widening");
            length += 1;
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, length: usize) -> RoomCode {
        let raw: String = (0..length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect();
        RoomCode::normalize(&raw)
    }
}
