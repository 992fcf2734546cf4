//! Output formatting utilities for CLI.

use std::fmt::Write;

use mazectf::tournament::{KnockoutResult, LeagueResult, TournamentResult};
use mazectf::GameResult;
use serde::Serialize;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Seed handed to the players.
    pub(super) seed: u64,
    /// The game summary.
    #[serde(flatten)]
    pub(super) result: &'a GameResult,
    /// The `Finished. ...` line.
    pub(super) finished: String,
}

impl<'a> JsonGameResult<'a> {
    pub(super) fn new(seed: u64, result: &'a GameResult) -> Self {
        Self {
            seed,
            result,
            finished: result.finished_line(),
        }
    }
}

/// Format a game result as human-readable text, ending in the finished line.
pub(super) fn format_game_text(result: &GameResult, seed: u64) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result (seed: {seed})");
    let _ = writeln!(output, "  Rounds: {}", result.rounds_played);
    let _ = writeln!(output, "  Food left: {}", result.food_left);
    for (name, score) in result.team_names.iter().zip(&result.scores) {
        let _ = writeln!(output, "  {name}: {score}");
    }
    if !result.failures.is_empty() {
        let _ = writeln!(output, "  Failures:");
        for failure in &result.failures {
            let _ = writeln!(
                output,
                "    round {} bot {}: {}",
                failure.round, failure.bot, failure.cause
            );
        }
    }
    let _ = writeln!(output, "{}", result.finished_line());

    output
}

/// Format the league table.
fn format_league_text(output: &mut String, league: &LeagueResult) {
    let _ = writeln!(output, "League ({} games)", league.matches.len());
    let _ = writeln!(output, "========================================");
    let _ = writeln!(
        output,
        "  {:<4}{:<20}{:>5}{:>4}{:>4}{:>4}{:>6}",
        "#", "team", "P", "W", "D", "L", "pts"
    );
    for (rank, s) in league.standings.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {:<4}{:<20}{:>5}{:>4}{:>4}{:>4}{:>6}",
            rank + 1,
            s.name,
            s.played,
            s.wins,
            s.draws,
            s.losses,
            s.points
        );
    }
    let _ = writeln!(output);
    for m in &league.matches {
        let _ = writeln!(output, "  {}", m.finished_line);
    }
}

/// Format the knockout pairings.
fn format_knockout_text(output: &mut String, knockout: &KnockoutResult) {
    let _ = writeln!(output, "Knockout");
    let _ = writeln!(output, "========================================");
    for m in &knockout.matches {
        let coin = if m.decided_by_coin { " (coin)" } else { "" };
        let _ = writeln!(
            output,
            "  stage {}: {} vs {} -> {}{coin}",
            m.stage, m.teams[0], m.teams[1], m.winner
        );
        for game in &m.games {
            let _ = writeln!(output, "    {}", game.finished_line);
        }
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "Champion: {}", knockout.champion);
}

/// Format a whole tournament as human-readable text.
pub(super) fn format_tournament_text(result: &TournamentResult) -> String {
    let mut output = String::new();
    format_league_text(&mut output, &result.league);
    let _ = writeln!(output);
    format_knockout_text(&mut output, &result.knockout);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazectf::master::FailureRecord;
    use mazectf::game::FailureCause;
    use mazectf::GameOutcome;

    fn sample() -> GameResult {
        GameResult {
            outcome: GameOutcome::Win {
                winner: 0,
                winner_name: "red".to_string(),
                loser_name: "blue".to_string(),
            },
            scores: vec![3, 1],
            rounds_played: 12,
            food_left: 2,
            team_names: vec!["red".to_string(), "blue".to_string()],
            failures: vec![FailureRecord {
                round: 4,
                bot: 1,
                cause: FailureCause::Timeout,
            }],
        }
    }

    #[test]
    fn test_text_ends_with_finished_line() {
        let text = format_game_text(&sample(), 7);
        assert!(text.starts_with("Game Result (seed: 7)"));
        assert!(text.contains("  red: 3\n"));
        assert!(text.contains("round 4 bot 1"));
        assert!(text.trim_end().ends_with("Finished. 'red' won over 'blue'."));
    }

    #[test]
    fn test_json_flattens_result() {
        let result = sample();
        let json = serde_json::to_value(JsonGameResult::new(7, &result)).unwrap();
        assert_eq!(json["seed"], 7);
        assert_eq!(json["scores"][0], 3);
        assert_eq!(json["outcome"]["result"], "win");
        assert_eq!(json["finished"], "Finished. 'red' won over 'blue'.");
    }
}
