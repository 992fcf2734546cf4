//! CLI command implementations for Mazectf.

pub(crate) mod generate;
pub(crate) mod run;
pub(crate) mod tournament;
pub(crate) mod validate;

mod output;

use clap::ValueEnum;
use mazectf::game::{Layout, DEFAULT_LAYOUT};
use mazectf::player::{builtin, BUILTIN_PLAYERS};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::{fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for the `run` and `tournament` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

impl From<mazectf::LayoutError> for CliError {
    fn from(e: mazectf::LayoutError) -> Self {
        Self::new(format!("Invalid layout: {e}"))
    }
}

impl From<mazectf::RegistrationError> for CliError {
    fn from(e: mazectf::RegistrationError) -> Self {
        Self::new(format!("Registration failed: {e}"))
    }
}

impl From<mazectf::GameError> for CliError {
    fn from(e: mazectf::GameError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<mazectf::tournament::TournamentError> for CliError {
    fn from(e: mazectf::tournament::TournamentError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<mazectf::game::MapGenError> for CliError {
    fn from(e: mazectf::game::MapGenError) -> Self {
        Self::new(e.to_string())
    }
}

/// Install the stderr log subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`; `verbose` forces `debug`.
pub(crate) fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Read a layout file, or fall back to the built-in layout.
pub(crate) fn load_layout(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display()))),
        None => Ok(DEFAULT_LAYOUT.to_string()),
    }
}

/// Bot count to use for `layout`: the explicit one, or every digit present.
pub(crate) fn bot_count(layout: &str, bots: Option<usize>) -> Result<usize, CliError> {
    let bots = bots.unwrap_or_else(|| Layout::count_bots(layout));
    // parse now for a clear error before any thread is started
    Layout::parse(layout, bots)?;
    Ok(bots)
}

/// A team given on the command line as `name=player` or `player`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TeamSpec {
    pub(crate) name: String,
    pub(crate) player: String,
}

impl TeamSpec {
    pub(crate) fn parse(spec: &str) -> Result<Self, CliError> {
        let (name, player) = spec.split_once('=').unwrap_or((spec, spec));
        if builtin(player, 0).is_none() {
            return Err(CliError::new(format!(
                "Unknown player {player:?} (available: {})",
                BUILTIN_PLAYERS.join(", ")
            )));
        }
        Ok(Self {
            name: name.to_string(),
            player: player.to_string(),
        })
    }
}

/// Convert a millisecond budget to a timeout, `0` meaning none.
pub(crate) fn timeout(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

/// Use `seed`, or derive one from the clock.
pub(crate) fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    })
}
