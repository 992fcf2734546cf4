//! Generate command implementation.

use super::{seed_or_random, CliError};
use mazectf::game::generate_layout;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the generate command.
///
/// # Errors
///
/// Returns an error if no layout fits the requested size or the output
/// cannot be written.
pub(crate) fn execute(
    seed: Option<u64>,
    width: u16,
    height: u16,
    bots: usize,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let seed = seed_or_random(seed);
    let layout = generate_layout(seed, width, height, bots)?;
    info!(seed, width, height, bots, "layout generated");

    match output {
        Some(path) => fs::write(path, format!("{layout}\n"))
            .map_err(|e| CliError::new(format!("Failed to write {}: {e}", path.display())))?,
        None => println!("{layout}"),
    }
    Ok(())
}
