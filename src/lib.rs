// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Mazectf: a deterministic capture-the-flag maze game engine.
//!
//! Two teams of bots move through a walled maze. A bot in its own half is a
//! defender and eats enemy bots that stray there; a bot in the enemy half is
//! an invader, collects the pellets lying there and scores for its team.
//!
//! This crate provides:
//! - Layout parsing and seeded layout generation
//! - The universe and its move resolution rules
//! - Player and viewer capabilities with built-in implementations
//! - A game master that isolates every player on its own thread
//! - League and knockout tournaments
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Tournament Runner            │
//! ├─────────────────────────────────────┤
//! │   Game Master  ──▶  Viewers         │
//! │        │                            │
//! │        ▼                            │
//! │   Player workers (one thread each)  │
//! ├─────────────────────────────────────┤
//! │   Universe (rules)  ◀── Layout      │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use mazectf::game::{Move, SMALL_LAYOUT};
//! use mazectf::master::GameMaster;
//! use mazectf::player::ScriptedPlayer;
//!
//! let mut game = GameMaster::new(SMALL_LAYOUT, 2, 10).unwrap();
//! game.register_player(ScriptedPlayer::new(vec![Move::East, Move::East]), 0).unwrap();
//! game.register_player(ScriptedPlayer::new(vec![Move::West]), 1).unwrap();
//! let result = game.play().unwrap();
//! assert_eq!(result.scores, vec![1, 0]);
//! assert_eq!(result.finished_line(), "Finished. 'team 0' won over 'team 1'.");
//! ```

pub mod diagnostics;
pub mod error;
pub mod game;
pub mod master;
pub mod player;
pub mod tournament;
pub mod viewer;

pub use error::{GameError, LayoutError, NotImplemented, RegistrationError};

// Re-export key types at crate root for convenience
pub use game::{BotId, Event, Move, Position, TeamId, Universe};
pub use master::{GameConfig, GameMaster, GameOutcome, GameResult};
pub use player::{BotView, Player};
pub use viewer::Viewer;
