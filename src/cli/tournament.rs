//! Tournament command implementation.

use super::output::format_tournament_text;
use super::{bot_count, load_layout, timeout, CliError, OutputFormat, TeamSpec};
use indicatif::{ProgressBar, ProgressStyle};
use mazectf::game::NUMBER_TEAMS;
use mazectf::player::{builtin, Player};
use mazectf::tournament::{
    run_knockout, run_league_with, TeamEntry, TournamentConfig, TournamentResult,
};
use std::path::PathBuf;
use std::time::Instant;

/// Build a tournament team whose bots all run the built-in `spec.player`.
fn team_entry(spec: TeamSpec, per_team: usize) -> TeamEntry {
    let player = spec.player;
    TeamEntry::new(spec.name, move |seed| {
        (0..per_team)
            .filter_map(|i| builtin(&player, seed.wrapping_add(i as u64)))
            .collect::<Vec<Box<dyn Player>>>()
    })
}

/// Arguments of the tournament command.
#[derive(Debug)]
pub(crate) struct TournamentArgs {
    pub(crate) teams: Vec<String>,
    pub(crate) layout: Option<PathBuf>,
    pub(crate) bots: Option<usize>,
    pub(crate) rounds: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) timeout_ms: u64,
    pub(crate) threads: Option<usize>,
    pub(crate) format: OutputFormat,
    pub(crate) progress: bool,
}

/// Execute the tournament command.
///
/// # Errors
///
/// Returns an error if the tournament fails.
pub(crate) fn execute(args: &TournamentArgs) -> Result<(), CliError> {
    let layout = load_layout(args.layout.as_deref())?;
    let number_bots = bot_count(&layout, args.bots)?;
    let per_team = number_bots / NUMBER_TEAMS;

    let entries = args
        .teams
        .iter()
        .map(|t| TeamSpec::parse(t).map(|spec| team_entry(spec, per_team)))
        .collect::<Result<Vec<_>, _>>()?;

    // Set thread pool size if specified
    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let config = TournamentConfig {
        rounds: args.rounds,
        player_timeout: timeout(args.timeout_ms),
        layout,
        number_bots,
        seed: args.seed.unwrap_or(42),
        ..TournamentConfig::default()
    };

    // Progress bar over the league games
    let league_games = (entries.len() * entries.len().saturating_sub(1) / 2) as u64;
    let pb = if args.progress {
        let pb = ProgressBar::new(league_games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    let league = run_league_with(&entries, &config, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("league done");
    }

    let ranked: Vec<TeamEntry> = league
        .standings
        .iter()
        .filter_map(|s| entries.iter().find(|t| t.name == s.name).cloned())
        .collect();
    let knockout = run_knockout(&ranked, &config)?;
    let result = TournamentResult { league, knockout };

    let duration = start.elapsed();

    // Output based on format
    match args.format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_tournament_text(&result));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)?;
            println!("{json}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_entry_builds_full_team() {
        let spec = TeamSpec::parse("eaters=food_eater").unwrap();
        let entry = team_entry(spec, 3);
        assert_eq!(entry.name, "eaters");
        assert_eq!((entry.factory)(9).len(), 3);
    }
}
