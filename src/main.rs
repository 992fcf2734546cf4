//! Mazectf CLI - run games and tournaments between maze bots.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Mazectf - a capture-the-flag maze game for programming agents
#[derive(Parser, Debug)]
#[command(name = "mazectf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single game between two teams of built-in players
    Run {
        /// Player for each team: stopping, random, nq_random or food_eater,
        /// optionally prefixed with a team name (`name=player`)
        #[arg(required = true, num_args = 2)]
        teams: Vec<String>,

        /// Layout file (default: built-in layout)
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// Number of bots (default: every digit in the layout)
        #[arg(short, long)]
        bots: Option<usize>,

        /// Number of rounds
        #[arg(short, long, default_value = "300")]
        rounds: u32,

        /// Random seed for the players (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Time budget per move in milliseconds, 0 for none
        #[arg(long, default_value = "3000")]
        timeout_ms: u64,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Record every round as JSON lines to this file
        #[arg(long)]
        dump: Option<PathBuf>,

        /// Print the maze after every round
        #[arg(short, long)]
        watch: bool,

        /// Log the live thread count every N seconds
        #[arg(long)]
        thread_info: Option<u64>,
    },

    /// Run a league followed by a knockout between teams of built-in players
    Tournament {
        /// Teams as `name=player` or just `player` (at least 2)
        #[arg(required = true, num_args = 2..)]
        teams: Vec<String>,

        /// Layout file (default: built-in layout)
        #[arg(short, long)]
        layout: Option<PathBuf>,

        /// Number of bots per game (default: every digit in the layout)
        #[arg(short, long)]
        bots: Option<usize>,

        /// Rounds per game
        #[arg(short, long, default_value = "300")]
        rounds: u32,

        /// Base seed (default: 42)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Time budget per move in milliseconds, 0 for none
        #[arg(long, default_value = "3000")]
        timeout_ms: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a layout file
    Validate {
        /// Layout file to validate
        #[arg(required = true)]
        layout: PathBuf,

        /// Expected number of bots (default: every digit in the layout)
        #[arg(short, long)]
        bots: Option<usize>,
    },

    /// Generate a random symmetric layout
    Generate {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Width in cells
        #[arg(long, default_value = "32")]
        width: u16,

        /// Height in cells
        #[arg(long, default_value = "16")]
        height: u16,

        /// Number of bots
        #[arg(short, long, default_value = "4")]
        bots: usize,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    cli::init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            teams,
            layout,
            bots,
            rounds,
            seed,
            timeout_ms,
            format,
            dump,
            watch,
            thread_info,
        } => cli::run::execute(&cli::run::RunArgs {
            teams,
            layout,
            bots,
            rounds,
            seed,
            timeout_ms,
            format,
            dump,
            watch,
            thread_info,
        }),

        Commands::Tournament {
            teams,
            layout,
            bots,
            rounds,
            seed,
            timeout_ms,
            threads,
            format,
            progress,
        } => cli::tournament::execute(&cli::tournament::TournamentArgs {
            teams,
            layout,
            bots,
            rounds,
            seed,
            timeout_ms,
            threads,
            format,
            progress,
        }),

        Commands::Validate { layout, bots } => cli::validate::execute(&layout, bots),

        Commands::Generate {
            seed,
            width,
            height,
            bots,
            output,
        } => cli::generate::execute(seed, width, height, bots, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
