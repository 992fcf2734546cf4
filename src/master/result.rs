//! Typed game results.

use std::fmt;

use serde::Serialize;

use crate::game::{BotId, FailureCause, TeamId, Universe};

/// How a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GameOutcome {
    /// One team scored more.
    Win {
        /// Winning team.
        winner: TeamId,
        /// Name of the winning team.
        winner_name: String,
        /// Name of the losing team.
        loser_name: String,
    },
    /// Equal scores.
    Draw {
        /// Names of both teams, by id.
        team_names: Vec<String>,
    },
}

impl GameOutcome {
    /// Decide the outcome from the final scores of `universe`.
    #[must_use]
    pub fn from_universe(universe: &Universe) -> Self {
        let teams = universe.teams();
        let best = teams.iter().map(|t| t.score).max().unwrap_or(0);
        let leaders: Vec<_> = teams.iter().filter(|t| t.score == best).collect();
        match leaders.as_slice() {
            [winner] => {
                let loser = teams
                    .iter()
                    .find(|t| t.id != winner.id)
                    .map(|t| t.name.clone())
                    .unwrap_or_default();
                GameOutcome::Win {
                    winner: winner.id,
                    winner_name: winner.name.clone(),
                    loser_name: loser,
                }
            }
            _ => GameOutcome::Draw {
                team_names: teams.iter().map(|t| t.name.clone()).collect(),
            },
        }
    }

    /// The winning team, if any.
    #[must_use]
    pub fn winner(&self) -> Option<TeamId> {
        match self {
            GameOutcome::Win { winner, .. } => Some(*winner),
            GameOutcome::Draw { .. } => None,
        }
    }
}

impl fmt::Display for GameOutcome {
    /// The one-line completion message, `Finished. ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Win {
                winner_name,
                loser_name,
                ..
            } => write!(f, "Finished. '{winner_name}' won over '{loser_name}'."),
            GameOutcome::Draw { team_names } => {
                let quoted: Vec<String> = team_names.iter().map(|n| format!("'{n}'")).collect();
                write!(f, "Finished. {} had a draw.", quoted.join(" and "))
            }
        }
    }
}

/// A player failure, with the round it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Round of the failure.
    pub round: u32,
    /// Bot whose player failed.
    pub bot: BotId,
    /// What went wrong.
    pub cause: FailureCause,
}

/// Summary of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// Winner or draw.
    pub outcome: GameOutcome,
    /// Final score of every team, by id.
    pub scores: Vec<u32>,
    /// Rounds completed.
    pub rounds_played: u32,
    /// Pellets left on the board.
    pub food_left: usize,
    /// Team names, by id.
    pub team_names: Vec<String>,
    /// Every player failure, in order.
    pub failures: Vec<FailureRecord>,
}

impl GameResult {
    /// The `Finished. ...` line.
    #[must_use]
    pub fn finished_line(&self) -> String {
        self.outcome.to_string()
    }
}
