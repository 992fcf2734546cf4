//! Game invariants - sanity checks that detect bugs.
//!
//! Move resolution should never break these. If one triggers, the rules
//! have a bug, not the agents.

use crate::game::{Universe, Zone};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(universe: &Universe) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let maze = universe.maze();

    for bot in universe.bots() {
        if maze.is_wall(bot.position) {
            violations.push(InvariantViolation {
                message: format!("Bot {} stands on wall at {}", bot.id, bot.position),
            });
        }
        if maze.is_wall(bot.initial_position) {
            violations.push(InvariantViolation {
                message: format!("Bot {} spawns on wall at {}", bot.id, bot.initial_position),
            });
        }
    }

    for &pos in universe.food() {
        if maze.is_wall(pos) {
            violations.push(InvariantViolation {
                message: format!("Food lies on wall at {pos}"),
            });
        }
    }

    let zones: Vec<Zone> = universe.teams().iter().map(|t| t.zone).collect();
    for pos in maze.floor() {
        let owners = zones.iter().filter(|z| z.contains(pos)).count();
        if owners != 1 {
            violations.push(InvariantViolation {
                message: format!("Floor cell {pos} belongs to {owners} zones"),
            });
        }
    }

    let eaten = universe.initial_food().saturating_sub(universe.food().len());
    let scored: u64 = universe.teams().iter().map(|t| u64::from(t.score)).sum();
    if universe.food().len() > universe.initial_food() || scored != eaten as u64 {
        violations.push(InvariantViolation {
            message: format!(
                "Score total {scored} does not match {eaten} pellets eaten ({} of {} left)",
                universe.food().len(),
                universe.initial_food()
            ),
        });
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(universe: &Universe) {
    let violations = check_invariants(universe);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_universe: &Universe) {}
