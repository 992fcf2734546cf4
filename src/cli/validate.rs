//! Validate command implementation.

use super::{bot_count, load_layout, CliError};
use mazectf::game::{check_invariants, Layout};
use mazectf::Universe;
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the layout cannot be read or is invalid.
pub(crate) fn execute(path: &Path, bots: Option<usize>) -> Result<(), CliError> {
    let text = load_layout(Some(path))?;
    let bots = bot_count(&text, bots)?;
    let layout = Layout::parse(&text, bots)?;
    let summary = summarize(&layout);

    let universe = Universe::from_layout(layout);
    let violations = check_invariants(&universe);
    if let Some(first) = violations.first() {
        return Err(CliError::new(format!(
            "{}: {} problem(s), first: {first}",
            path.display(),
            violations.len()
        )));
    }

    println!("{}: valid", path.display());
    print!("{summary}");
    Ok(())
}

fn summarize(layout: &Layout) -> String {
    let floor = layout.maze.floor().count();
    format!(
        "  Size: {}x{}\n  Floor cells: {floor}\n  Food: {}\n  Bots: {}\n",
        layout.maze.width(),
        layout.maze.height(),
        layout.food.len(),
        layout.bots.len()
    )
}
