//! In-process tournaments.
//!
//! Teams are given as named factories producing their players. A tournament
//! is a league (everybody against everybody) followed by a knockout bracket
//! seeded from the league ranking:
//!
//! - A won game is worth [`TournamentConfig::points_win`] points, a draw
//!   [`TournamentConfig::points_draw`] to both sides.
//! - Knockout games that end in a draw are replayed as deathmatches, up to
//!   [`TournamentConfig::max_deathmatches`] games, after which a seeded coin
//!   decides.
//!
//! Games of one stage run in parallel with rayon. All randomness (side
//! assignment, player seeds, coin flips) derives from
//! [`TournamentConfig::seed`], so a tournament is reproducible.

mod knockout;
mod league;

pub use knockout::{run_knockout, KnockoutMatch, KnockoutResult};
pub use league::{run_league, run_league_with, LeagueResult, Standing};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::{GameError, LayoutError, RegistrationError};
use crate::game::{DEFAULT_LAYOUT, NUMBER_TEAMS};
use crate::master::{GameConfig, GameMaster};
use crate::player::Player;

/// Builds the players of one team for one game, given a per-game seed.
pub type TeamFactory = Arc<dyn Fn(u64) -> Vec<Box<dyn Player>> + Send + Sync>;

/// A named team taking part in a tournament.
#[derive(Clone)]
pub struct TeamEntry {
    /// Display name, unique within a tournament.
    pub name: String,
    /// Player factory.
    pub factory: TeamFactory,
}

impl TeamEntry {
    /// Create an entry from a name and a factory.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(u64) -> Vec<Box<dyn Player>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }
}

impl fmt::Debug for TeamEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Configuration for the tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentConfig {
    /// Rounds per game.
    pub rounds: u32,
    /// Time budget for one `get_move` call.
    pub player_timeout: Option<Duration>,
    /// Layout text every game is played on.
    pub layout: String,
    /// Bots per game, split evenly between the two teams.
    pub number_bots: usize,
    /// Base seed for sides, player seeds and coin flips.
    pub seed: u64,
    /// Points for a won league game.
    pub points_win: u32,
    /// Points for a drawn league game.
    pub points_draw: u32,
    /// Knockout games played before the coin decides.
    pub max_deathmatches: u32,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds: 300,
            player_timeout: Some(Duration::from_secs(3)),
            layout: DEFAULT_LAYOUT.to_string(),
            number_bots: 4,
            seed: 42,
            points_win: 2,
            points_draw: 1,
            max_deathmatches: 3,
        }
    }
}

/// Tournament errors.
#[derive(Debug, Error)]
pub enum TournamentError {
    /// A tournament needs at least two teams.
    #[error("need at least 2 teams, got {0}")]
    TooFewTeams(usize),
    /// Two teams share a name.
    #[error("team name {0:?} is used twice")]
    DuplicateName(String),
    /// Bots cannot be split evenly between two teams.
    #[error("need an even number of bots, got {0}")]
    InvalidBotCount(usize),
    /// The configured layout is invalid.
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    /// A factory produced the wrong number of players.
    #[error("team {team:?} produced {actual} players, expected {expected}")]
    TeamSize {
        /// Team name.
        team: String,
        /// Players needed.
        expected: usize,
        /// Players produced.
        actual: usize,
    },
    /// A produced player was refused.
    #[error("team {team:?}: {source}")]
    Registration {
        /// Team name.
        team: String,
        /// Why it was refused.
        #[source]
        source: RegistrationError,
    },
    /// A game could not be played.
    #[error("game failed: {0}")]
    Game(#[from] GameError),
}

/// Outcome of one game between two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Seed the game was played with.
    pub seed: u64,
    /// Team names by side: team 0 first.
    pub teams: [String; NUMBER_TEAMS],
    /// Final scores by side.
    pub scores: Vec<u32>,
    /// Winning team name, `None` on a draw.
    pub winner: Option<String>,
    /// Rounds completed.
    pub rounds_played: u32,
    /// Number of player failures during the game.
    pub failures: usize,
    /// The `Finished. ...` line of the game.
    pub finished_line: String,
}

/// Play one game with `first` as team 0 and `second` as team 1.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a factory produces
/// the wrong number of players or unregistrable players.
pub fn play_match(
    first: &TeamEntry,
    second: &TeamEntry,
    config: &TournamentConfig,
    seed: u64,
) -> Result<MatchResult, TournamentError> {
    check_bot_count(config.number_bots)?;
    let game_config = GameConfig {
        game_time: config.rounds,
        player_timeout: config.player_timeout,
        team_names: [first.name.clone(), second.name.clone()],
        stop_when_food_exhausted: true,
    };
    let mut gm = GameMaster::with_config(&config.layout, config.number_bots, game_config)?;

    let per_team = config.number_bots / NUMBER_TEAMS;
    for (team, entry) in [first, second].into_iter().enumerate() {
        let players = (entry.factory)(seed.wrapping_add(team as u64));
        if players.len() != per_team {
            return Err(TournamentError::TeamSize {
                team: entry.name.clone(),
                expected: per_team,
                actual: players.len(),
            });
        }
        for (i, player) in players.into_iter().enumerate() {
            gm.register_player(player, i * NUMBER_TEAMS + team)
                .map_err(|source| TournamentError::Registration {
                    team: entry.name.clone(),
                    source,
                })?;
        }
    }

    let result = gm.play()?;
    debug!(seed, line = %result.finished_line(), "match finished");
    Ok(MatchResult {
        seed,
        teams: [first.name.clone(), second.name.clone()],
        winner: result
            .outcome
            .winner()
            .and_then(|team| result.team_names.get(team).cloned()),
        scores: result.scores.clone(),
        rounds_played: result.rounds_played,
        failures: result.failures.len(),
        finished_line: result.finished_line(),
    })
}

/// Result of a league followed by a knockout.
#[derive(Debug, Clone, Serialize)]
pub struct TournamentResult {
    /// League stage.
    pub league: LeagueResult,
    /// Knockout stage, seeded by the league ranking.
    pub knockout: KnockoutResult,
}

/// Run a league, then a knockout seeded from its ranking.
///
/// # Errors
///
/// Returns the first error of any stage.
pub fn run_tournament(
    teams: &[TeamEntry],
    config: &TournamentConfig,
) -> Result<TournamentResult, TournamentError> {
    let league = run_league(teams, config)?;
    let ranked: Vec<TeamEntry> = league
        .standings
        .iter()
        .filter_map(|s| teams.iter().find(|t| t.name == s.name).cloned())
        .collect();
    let knockout = run_knockout(&ranked, config)?;
    Ok(TournamentResult { league, knockout })
}

fn check_bot_count(number_bots: usize) -> Result<(), TournamentError> {
    if number_bots < NUMBER_TEAMS || number_bots % NUMBER_TEAMS != 0 {
        return Err(TournamentError::InvalidBotCount(number_bots));
    }
    Ok(())
}

/// Validate a team list: enough teams, unique names.
fn check_teams(teams: &[TeamEntry]) -> Result<(), TournamentError> {
    if teams.len() < 2 {
        return Err(TournamentError::TooFewTeams(teams.len()));
    }
    for (i, team) in teams.iter().enumerate() {
        if teams[..i].iter().any(|t| t.name == team.name) {
            return Err(TournamentError::DuplicateName(team.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::SMALL_LAYOUT;
    use crate::player::{FoodEaterPlayer, StoppingPlayer};

    pub(crate) fn stoppers(name: &str) -> TeamEntry {
        TeamEntry::new(name, |_| vec![Box::new(StoppingPlayer) as Box<dyn Player>])
    }

    pub(crate) fn eaters(name: &str) -> TeamEntry {
        TeamEntry::new(name, |_| vec![Box::new(FoodEaterPlayer) as Box<dyn Player>])
    }

    pub(crate) fn small_config() -> TournamentConfig {
        TournamentConfig {
            rounds: 20,
            layout: SMALL_LAYOUT.to_string(),
            number_bots: 2,
            ..TournamentConfig::default()
        }
    }

    #[test]
    fn test_play_match_win() {
        let result = play_match(&eaters("eat"), &stoppers("stop"), &small_config(), 1).unwrap();
        assert_eq!(result.winner.as_deref(), Some("eat"));
        assert_eq!(result.finished_line, "Finished. 'eat' won over 'stop'.");
        assert_eq!(result.scores, vec![1, 0]);
    }

    #[test]
    fn test_play_match_draw() {
        let result = play_match(&stoppers("a"), &stoppers("b"), &small_config(), 1).unwrap();
        assert_eq!(result.winner, None);
        assert_eq!(result.rounds_played, 20);
    }

    #[test]
    fn test_team_size_checked() {
        let config = TournamentConfig {
            number_bots: 4,
            ..TournamentConfig::default()
        };
        let err = play_match(&stoppers("a"), &stoppers("b"), &config, 1).unwrap_err();
        assert!(matches!(
            err,
            TournamentError::TeamSize {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_odd_bot_count_rejected() {
        let config = TournamentConfig {
            number_bots: 3,
            ..small_config()
        };
        let err = play_match(&stoppers("a"), &stoppers("b"), &config, 1).unwrap_err();
        assert!(matches!(err, TournamentError::InvalidBotCount(3)));
    }

    #[test]
    fn test_check_teams() {
        assert!(matches!(
            check_teams(&[stoppers("a")]),
            Err(TournamentError::TooFewTeams(1))
        ));
        assert!(matches!(
            check_teams(&[stoppers("a"), stoppers("a")]),
            Err(TournamentError::DuplicateName(_))
        ));
        assert!(check_teams(&[stoppers("a"), stoppers("b")]).is_ok());
    }

    #[test]
    fn test_run_tournament() {
        let teams = [stoppers("s1"), eaters("e1"), stoppers("s2")];
        let result = run_tournament(&teams, &small_config()).unwrap();
        assert_eq!(result.league.standings[0].name, "e1");
        assert_eq!(result.knockout.champion, "e1");
    }
}
