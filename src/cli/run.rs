//! Run command implementation.

use super::output::{format_game_text, JsonGameResult};
use super::{bot_count, load_layout, seed_or_random, timeout, CliError, OutputFormat, TeamSpec};
use mazectf::diagnostics::ThreadInfoLogger;
use mazectf::game::NUMBER_TEAMS;
use mazectf::player::builtin;
use mazectf::viewer::{AsciiViewer, LogViewer, RecordingViewer};
use mazectf::{GameConfig, GameMaster};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Arguments of the run command.
#[derive(Debug)]
pub(crate) struct RunArgs {
    pub(crate) teams: Vec<String>,
    pub(crate) layout: Option<PathBuf>,
    pub(crate) bots: Option<usize>,
    pub(crate) rounds: u32,
    pub(crate) seed: Option<u64>,
    pub(crate) timeout_ms: u64,
    pub(crate) format: OutputFormat,
    pub(crate) dump: Option<PathBuf>,
    pub(crate) watch: bool,
    pub(crate) thread_info: Option<u64>,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the layout, the players or the game fail.
pub(crate) fn execute(args: &RunArgs) -> Result<(), CliError> {
    let teams = args
        .teams
        .iter()
        .map(|t| TeamSpec::parse(t))
        .collect::<Result<Vec<_>, _>>()?;
    if teams.len() != NUMBER_TEAMS {
        return Err(CliError::new(format!(
            "Expected {NUMBER_TEAMS} teams, got {}",
            teams.len()
        )));
    }

    let layout = load_layout(args.layout.as_deref())?;
    let bots = bot_count(&layout, args.bots)?;
    let seed = seed_or_random(args.seed);

    let config = GameConfig {
        game_time: args.rounds,
        player_timeout: timeout(args.timeout_ms),
        team_names: [teams[0].name.clone(), teams[1].name.clone()],
        stop_when_food_exhausted: true,
    };
    let mut game = GameMaster::with_config(&layout, bots, config)?;

    for bot in 0..bots {
        let team = &teams[bot % NUMBER_TEAMS];
        let player = builtin(&team.player, seed.wrapping_add(bot as u64))
            .ok_or_else(|| CliError::new(format!("Unknown player {:?}", team.player)))?;
        game.register_player(player, bot)?;
    }

    game.register_viewer(LogViewer)?;
    if args.watch {
        game.register_viewer(AsciiViewer::new(io::stdout()))?;
    }
    if let Some(path) = &args.dump {
        let file = File::create(path)
            .map_err(|e| CliError::new(format!("Failed to create {}: {e}", path.display())))?;
        game.register_viewer(RecordingViewer::new(BufWriter::new(file)))?;
    }

    let logger = args
        .thread_info
        .map(|secs| ThreadInfoLogger::start(Duration::from_secs(secs.max(1)), true))
        .transpose()?;

    info!(seed, bots, rounds = args.rounds, "game started");
    let result = game.play()?;

    if let Some(logger) = logger {
        logger.stop();
    }
    // release the dump file before reporting
    drop(game);

    match args.format {
        OutputFormat::Text => print!("{}", format_game_text(&result, seed)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonGameResult::new(seed, &result))?;
            println!("{json}");
        }
    }

    Ok(())
}
