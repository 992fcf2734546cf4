//! Error types for the game engine.
//!
//! Only the errors in this module ever propagate out of the engine. Agent
//! failures and illegal moves are recovered locally and surface as
//! [`Event`](crate::game::Event)s instead.

use thiserror::Error;

use crate::game::BotId;

/// Malformed maze text, reported when a layout is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contains no rows.
    #[error("layout is empty")]
    Empty,
    /// A row differs in length from the first row.
    #[error("row {row} has length {actual}, expected {expected}")]
    UnequalRows {
        /// Offending row (0-indexed).
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A character outside the layout grammar.
    #[error("invalid character {ch:?} at ({x}, {y})")]
    InvalidCharacter {
        /// The character found.
        ch: char,
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// A bot digit appears more than once.
    #[error("bot {bot} appears more than once")]
    DuplicateBot {
        /// The repeated digit.
        bot: BotId,
    },
    /// A bot digit at or above the expected bot count.
    #[error("bot {bot} is out of range for {expected} bots")]
    UnexpectedBot {
        /// The digit found.
        bot: BotId,
        /// The number of bots requested.
        expected: usize,
    },
    /// A bot digit below the expected bot count is absent.
    #[error("bot {bot} is missing from the layout")]
    MissingBot {
        /// The absent digit.
        bot: BotId,
    },
    /// A perimeter cell is not a wall.
    #[error("perimeter is open at ({x}, {y})")]
    OpenPerimeter {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// The layout does not fit the coordinate range.
    #[error("layout of {width}x{height} is too large")]
    TooLarge {
        /// Columns.
        width: usize,
        /// Rows.
        height: usize,
    },
    /// Fewer bots than the two teams need.
    #[error("need at least 2 bots, got {0}")]
    TooFewBots(usize),
}

/// A candidate agent was rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The candidate relies on the placeholder of a capability method.
    #[error("{capability} is not implemented")]
    NotImplemented {
        /// Name of the missing capability method.
        capability: &'static str,
    },
    /// The bot id does not exist in this game.
    #[error("bot {bot} is out of range (game has {number_bots} bots)")]
    BotOutOfRange {
        /// Requested bot.
        bot: BotId,
        /// Bots in the game.
        number_bots: usize,
    },
    /// A player is already registered for this bot.
    #[error("bot {0} already has a player")]
    AlreadyRegistered(BotId),
    /// The player's worker thread could not be started.
    #[error("could not start worker for bot {bot}: {reason}")]
    WorkerSpawn {
        /// Requested bot.
        bot: BotId,
        /// OS error message.
        reason: String,
    },
}

/// The game cannot advance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Some bot slots have no registered player.
    #[error("game is not ready, bots without a player: {missing:?}")]
    NotReady {
        /// Bots still waiting for a player.
        missing: Vec<BotId>,
    },
    /// The game has already finished.
    #[error("game is already finished")]
    Finished,
}

/// Returned by the placeholder implementation of a capability method.
///
/// Travels inside `anyhow::Error`; use `downcast_ref` to detect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not implemented")]
pub struct NotImplemented(pub &'static str);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_error_display() {
        let err = LayoutError::UnequalRows {
            row: 2,
            expected: 6,
            actual: 5,
        };
        assert_eq!(err.to_string(), "row 2 has length 5, expected 6");

        let err = LayoutError::OpenPerimeter { x: 0, y: 1 };
        assert!(err.to_string().contains("(0, 1)"));
    }

    #[test]
    fn test_not_implemented_downcast() {
        let err: anyhow::Error = NotImplemented("Player::get_move").into();
        assert_eq!(
            err.downcast_ref::<NotImplemented>(),
            Some(&NotImplemented("Player::get_move"))
        );
    }

    #[test]
    fn test_game_error_lists_missing() {
        let err = GameError::NotReady { missing: vec![1, 3] };
        assert!(err.to_string().contains("[1, 3]"));
    }
}
