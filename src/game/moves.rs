//! Move and event vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::game::{BotId, Position, TeamId};

/// One step a bot can take in a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    /// One row up.
    North,
    /// One row down.
    South,
    /// One column right.
    East,
    /// One column left.
    West,
    /// Stay in place.
    Stop,
}

impl Move {
    /// Every move, in a fixed order.
    pub const ALL: [Move; 5] = [Move::North, Move::South, Move::East, Move::West, Move::Stop];

    /// Position delta `(dx, dy)` of this move.
    #[must_use]
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Move::North => (0, -1),
            Move::South => (0, 1),
            Move::East => (1, 0),
            Move::West => (-1, 0),
            Move::Stop => (0, 0),
        }
    }

    /// The move with the given delta, if it is part of the vocabulary.
    #[must_use]
    pub fn from_delta(delta: (i16, i16)) -> Option<Move> {
        Move::ALL.into_iter().find(|mv| mv.delta() == delta)
    }

    /// The move that undoes this one.
    #[must_use]
    pub const fn reverse(self) -> Move {
        match self {
            Move::North => Move::South,
            Move::South => Move::North,
            Move::East => Move::West,
            Move::West => Move::East,
            Move::Stop => Move::Stop,
        }
    }

    /// Lowercase name of the move.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Move::North => "north",
            Move::South => "south",
            Move::East => "east",
            Move::West => "west",
            Move::Stop => "stop",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string that names no move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown move {0:?}")]
pub struct UnknownMove(pub String);

impl FromStr for Move {
    type Err = UnknownMove;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::ALL
            .into_iter()
            .find(|mv| mv.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMove(s.to_string()))
    }
}

/// Why a player produced no usable move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// `get_move` returned an error.
    Error(String),
    /// `get_move` panicked.
    Panicked(String),
    /// No answer within the player timeout.
    Timeout,
    /// The player's worker is gone.
    Disconnected,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(msg) => write!(f, "error: {msg}"),
            FailureCause::Panicked(msg) => write!(f, "panicked: {msg}"),
            FailureCause::Timeout => f.write_str("timed out"),
            FailureCause::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Outcome of a single turn, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A bot changed position.
    BotMoved {
        /// The bot.
        bot: BotId,
        /// Where it was.
        from: Position,
        /// Where it is now.
        to: Position,
    },
    /// A move ran into a wall; the bot stayed put.
    IllegalMove {
        /// The bot.
        bot: BotId,
        /// The rejected move.
        attempted: Move,
    },
    /// An invader was caught and sent back to its spawn.
    BotEaten {
        /// The caught bot.
        eaten: BotId,
        /// The defender credited with the catch.
        eater: BotId,
    },
    /// A pellet was removed from the maze.
    FoodEaten {
        /// Where the pellet was.
        position: Position,
        /// Team credited with it.
        team: TeamId,
    },
    /// A team's score went up.
    TeamScored {
        /// The team.
        team: TeamId,
        /// Its new total.
        score: u32,
    },
    /// A player failed to produce a move and was forced to stop.
    PlayerFailure {
        /// The bot the player controls.
        bot: BotId,
        /// What went wrong.
        cause: FailureCause,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_delta_roundtrip() {
        for mv in Move::ALL {
            assert_eq!(Move::from_delta(mv.delta()), Some(mv));
        }
        assert_eq!(Move::from_delta((2, 0)), None);
        assert_eq!(Move::from_delta((1, 1)), None);
    }

    #[test]
    fn test_move_reverse() {
        assert_eq!(Move::North.reverse(), Move::South);
        assert_eq!(Move::East.reverse(), Move::West);
        assert_eq!(Move::Stop.reverse(), Move::Stop);
    }

    #[test]
    fn test_move_parse() {
        assert_eq!("east".parse::<Move>(), Ok(Move::East));
        assert_eq!(" North ".parse::<Move>(), Ok(Move::North));
        assert!("up".parse::<Move>().is_err());
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::TeamScored { team: 1, score: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"team_scored","team":1,"score":3}"#);

        let event = Event::PlayerFailure {
            bot: 0,
            cause: FailureCause::Timeout,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""kind":"timeout""#));
    }
}
