//! Game layer.
//!
//! Implements the data model and the rules:
//! - Maze geometry and team zones
//! - Layout parsing and built-in layouts
//! - Universe state and move resolution
//! - Move and event vocabulary
//! - Seeded layout generation

mod invariants;
mod layout;
mod mapgen;
mod maze;
mod moves;
mod universe;

pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use layout::{Layout, DEFAULT_LAYOUT, SMALL_LAYOUT};
pub use mapgen::{generate_layout, MapGenError};
pub use maze::{Axis, Maze, Position, Zone};
pub use moves::{Event, FailureCause, Move, UnknownMove};
pub use universe::{Bot, BotId, Entity, Team, TeamId, Universe, NUMBER_TEAMS};
