//! Knockout stage.
//!
//! The largest power-of-two prefix of the ranking plays a bracket, best
//! against worst in the first stage. Teams ranked below the bracket then
//! challenge the champion one at a time, best ranked first.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::{
    check_bot_count, check_teams, play_match, MatchResult, TeamEntry, TournamentConfig,
    TournamentError,
};

/// Mixed into the base seed so knockout draws differ from league draws.
const KNOCKOUT_SALT: u64 = 0x6b6e_6f63_6b6f_7574;

/// One pairing of the knockout, possibly decided over several games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnockoutMatch {
    /// Stage of the bracket, 0 first.
    pub stage: u32,
    /// The two teams, higher ranked first.
    pub teams: [String; 2],
    /// Games played, first game first.
    pub games: Vec<MatchResult>,
    /// Team that goes through.
    pub winner: String,
    /// Every game was drawn and a coin decided.
    pub decided_by_coin: bool,
}

/// Result of the knockout stage.
#[derive(Debug, Clone, Serialize)]
pub struct KnockoutResult {
    /// Every pairing, stage by stage.
    pub matches: Vec<KnockoutMatch>,
    /// Tournament winner.
    pub champion: String,
}

/// Run a knockout over `ranked`, best team first.
///
/// # Errors
///
/// Returns an error if fewer than two teams are given, names repeat, or any
/// game cannot be set up.
pub fn run_knockout(
    ranked: &[TeamEntry],
    config: &TournamentConfig,
) -> Result<KnockoutResult, TournamentError> {
    check_teams(ranked)?;
    check_bot_count(config.number_bots)?;

    let mut rng = StdRng::seed_from_u64(config.seed ^ KNOCKOUT_SALT);
    let n = ranked.len();
    let bracket = if n.is_power_of_two() {
        n
    } else {
        n.next_power_of_two() / 2
    };
    info!(teams = n, bracket, "knockout started");

    let mut matches = Vec::new();
    let mut pairs: Vec<(usize, usize)> = (0..bracket / 2).map(|i| (i, bracket - 1 - i)).collect();
    let mut stage = 0;
    let mut champion = loop {
        let seeded: Vec<(usize, usize, u64)> = pairs
            .iter()
            .map(|&(a, b)| (a, b, rng.next_u64()))
            .collect();
        let results = seeded
            .par_iter()
            .map(|&(a, b, seed)| deathmatch(ranked, a, b, stage, config, seed))
            .collect::<Result<Vec<_>, TournamentError>>()?;

        let winners: Vec<usize> = results.iter().map(|(winner, _)| *winner).collect();
        matches.extend(results.into_iter().map(|(_, m)| m));
        stage += 1;

        match winners.as_slice() {
            [winner] => break *winner,
            _ => pairs = winners.chunks(2).map(|c| (c[0], c[c.len() - 1])).collect(),
        }
    };

    for challenger in bracket..n {
        let (winner, m) = deathmatch(ranked, champion, challenger, stage, config, rng.next_u64())?;
        matches.push(m);
        champion = winner;
        stage += 1;
    }

    let champion = ranked[champion].name.clone();
    info!(%champion, "knockout finished");
    Ok(KnockoutResult { matches, champion })
}

/// Play `a` against `b` until one wins, at most `max_deathmatches` games,
/// then flip a coin. Sides alternate between games.
fn deathmatch(
    teams: &[TeamEntry],
    a: usize,
    b: usize,
    stage: u32,
    config: &TournamentConfig,
    seed: u64,
) -> Result<(usize, KnockoutMatch), TournamentError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut games = Vec::new();
    let mut winner = None;

    for game in 0..config.max_deathmatches {
        let (first, second) = if game % 2 == 0 { (a, b) } else { (b, a) };
        let result = play_match(&teams[first], &teams[second], config, rng.next_u64())?;
        winner = result
            .winner
            .as_deref()
            .map(|name| if name == teams[a].name { a } else { b });
        games.push(result);
        if winner.is_some() {
            break;
        }
        debug!(a = %teams[a].name, b = %teams[b].name, game, "draw, replaying as deathmatch");
    }

    let decided_by_coin = winner.is_none();
    let winner = winner.unwrap_or_else(|| {
        let pick = if rng.gen_bool(0.5) { a } else { b };
        info!(
            a = %teams[a].name,
            b = %teams[b].name,
            winner = %teams[pick].name,
            "no winner after deathmatches, coin decides"
        );
        pick
    });

    Ok((
        winner,
        KnockoutMatch {
            stage,
            teams: [teams[a].name.clone(), teams[b].name.clone()],
            games,
            winner: teams[winner].name.clone(),
            decided_by_coin,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::tests::{eaters, small_config, stoppers};

    #[test]
    fn test_two_team_knockout() {
        let teams = [stoppers("stop"), eaters("eat")];
        let result = run_knockout(&teams, &small_config()).unwrap();
        assert_eq!(result.champion, "eat");
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].games.len(), 1);
        assert!(!result.matches[0].decided_by_coin);
    }

    #[test]
    fn test_draws_go_to_the_coin() {
        let teams = [stoppers("a"), stoppers("b")];
        let result = run_knockout(&teams, &small_config()).unwrap();
        let m = &result.matches[0];
        assert_eq!(m.games.len(), 3);
        assert!(m.decided_by_coin);
        assert!(result.champion == "a" || result.champion == "b");
        // sides alternate between replays
        assert_eq!(m.games[0].teams[0], "a");
        assert_eq!(m.games[1].teams[0], "b");

        let again = run_knockout(&teams, &small_config()).unwrap();
        assert_eq!(again.champion, result.champion);
    }

    #[test]
    fn test_five_team_bracket_shape() {
        // ranks 1 v 4, 2 v 3, winners meet, then rank 5 challenges
        let teams = [
            eaters("first"),
            stoppers("second"),
            stoppers("third"),
            stoppers("fourth"),
            stoppers("fifth"),
        ];
        let config = TournamentConfig {
            max_deathmatches: 1,
            ..small_config()
        };
        let result = run_knockout(&teams, &config).unwrap();
        let pairings: Vec<(u32, [&str; 2])> = result
            .matches
            .iter()
            .map(|m| (m.stage, [m.teams[0].as_str(), m.teams[1].as_str()]))
            .collect();
        assert_eq!(pairings[0], (0, ["first", "fourth"]));
        assert_eq!(pairings[1], (0, ["second", "third"]));
        assert_eq!(pairings[2].0, 1);
        assert_eq!(pairings[2].1[0], "first");
        assert_eq!(pairings[3], (2, ["first", "fifth"]));
        assert_eq!(result.champion, "first");
    }

    #[test]
    fn test_zero_deathmatches_is_a_coin_flip() {
        let config = TournamentConfig {
            max_deathmatches: 0,
            ..small_config()
        };
        let result = run_knockout(&[eaters("a"), stoppers("b")], &config).unwrap();
        assert!(result.matches[0].games.is_empty());
        assert!(result.matches[0].decided_by_coin);
    }
}
