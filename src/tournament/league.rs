//! League stage: every team plays every other team once.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use super::{
    check_bot_count, check_teams, play_match, MatchResult, TeamEntry, TournamentConfig,
    TournamentError,
};

/// A team's line in the league table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Team name.
    pub name: String,
    /// League points.
    pub points: u32,
    /// Games played.
    pub played: u32,
    /// Games won.
    pub wins: u32,
    /// Games drawn.
    pub draws: u32,
    /// Games lost.
    pub losses: u32,
}

impl Standing {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: 0,
            played: 0,
            wins: 0,
            draws: 0,
            losses: 0,
        }
    }
}

/// Result of the league stage.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueResult {
    /// Every game, in the order it was scheduled.
    pub matches: Vec<MatchResult>,
    /// Ranking: points descending, then name ascending.
    pub standings: Vec<Standing>,
}

/// Run a league.
///
/// # Errors
///
/// Returns an error if fewer than two teams are given, names repeat, or any
/// game cannot be set up.
pub fn run_league(
    teams: &[TeamEntry],
    config: &TournamentConfig,
) -> Result<LeagueResult, TournamentError> {
    run_league_with(teams, config, |_| {})
}

/// Run a league, calling `on_match` as each game finishes.
///
/// Games run in parallel, so `on_match` may be called from several threads
/// and in any order.
///
/// # Errors
///
/// Same as [`run_league`].
pub fn run_league_with<F>(
    teams: &[TeamEntry],
    config: &TournamentConfig,
    on_match: F,
) -> Result<LeagueResult, TournamentError>
where
    F: Fn(&MatchResult) + Sync,
{
    check_teams(teams)?;
    check_bot_count(config.number_bots)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut fixtures: Vec<(usize, usize, u64)> = Vec::new();
    for i in 0..teams.len() {
        for j in i + 1..teams.len() {
            let (a, b) = if rng.gen_bool(0.5) { (j, i) } else { (i, j) };
            fixtures.push((a, b, rng.next_u64()));
        }
    }
    fixtures.shuffle(&mut rng);
    info!(teams = teams.len(), games = fixtures.len(), "league started");

    let matches = fixtures
        .par_iter()
        .map(|&(a, b, seed)| {
            let result = play_match(&teams[a], &teams[b], config, seed)?;
            on_match(&result);
            Ok(result)
        })
        .collect::<Result<Vec<_>, TournamentError>>()?;

    let mut standings: Vec<Standing> = teams.iter().map(|t| Standing::new(&t.name)).collect();
    for (&(a, b, _), result) in fixtures.iter().zip(&matches) {
        for side in [a, b] {
            standings[side].played += 1;
        }
        match result.winner.as_deref() {
            None => {
                for side in [a, b] {
                    standings[side].draws += 1;
                    standings[side].points += config.points_draw;
                }
            }
            Some(winner) => {
                let (won, lost) = if winner == teams[a].name { (a, b) } else { (b, a) };
                standings[won].wins += 1;
                standings[won].points += config.points_win;
                standings[lost].losses += 1;
            }
        }
    }
    standings.sort_by(|x, y| y.points.cmp(&x.points).then_with(|| x.name.cmp(&y.name)));

    if let Some(leader) = standings.first() {
        info!(leader = %leader.name, points = leader.points, "league finished");
    }
    Ok(LeagueResult { matches, standings })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::tournament::tests::{eaters, small_config, stoppers};

    #[test]
    fn test_league_points_and_ranking() {
        let teams = [stoppers("b"), stoppers("a"), eaters("eat")];
        let result = run_league(&teams, &small_config()).unwrap();
        assert_eq!(result.matches.len(), 3);

        let table: Vec<(&str, u32)> = result
            .standings
            .iter()
            .map(|s| (s.name.as_str(), s.points))
            .collect();
        assert_eq!(table, vec![("eat", 4), ("a", 1), ("b", 1)]);
        assert_eq!(result.standings[0].wins, 2);
        assert_eq!(result.standings[1].draws, 1);
        assert_eq!(result.standings[1].losses, 1);
    }

    #[test]
    fn test_league_is_reproducible() {
        let teams = [stoppers("a"), eaters("b"), eaters("c")];
        let first = run_league(&teams, &small_config()).unwrap();
        let second = run_league(&teams, &small_config()).unwrap();
        assert_eq!(first.matches, second.matches);
        assert_eq!(first.standings, second.standings);
    }

    #[test]
    fn test_on_match_called_per_game() {
        let teams = [stoppers("a"), stoppers("b"), stoppers("c"), stoppers("d")];
        let seen = AtomicUsize::new(0);
        run_league_with(&teams, &small_config(), |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 6);
    }
}
