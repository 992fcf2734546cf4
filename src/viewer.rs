//! The Viewer capability: passive observers of finished rounds.
//!
//! Viewers run on the game master's thread after a round's moves are
//! committed. A viewer that errors or panics is logged and skipped; it can
//! never stall or roll back the game.

use std::io::Write;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::NotImplemented;
use crate::game::{Event, Position, Universe};

/// An observer receiving one snapshot per round.
pub trait Viewer {
    /// Observe the universe after `round`, in which `turns` turns were played
    /// producing `events` in order.
    ///
    /// # Errors
    ///
    /// The placeholder always fails with [`NotImplemented`].
    fn observe(
        &mut self,
        _round: u32,
        _turns: u32,
        _universe: &Universe,
        _events: &[Event],
    ) -> anyhow::Result<()> {
        Err(NotImplemented("Viewer::observe").into())
    }

    /// Marker that this type supplies its own [`Viewer::observe`].
    ///
    /// Registration rejects viewers that return `false` here.
    fn is_implemented(&self) -> bool {
        false
    }
}

impl<V: Viewer + ?Sized> Viewer for Box<V> {
    fn observe(
        &mut self,
        round: u32,
        turns: u32,
        universe: &Universe,
        events: &[Event],
    ) -> anyhow::Result<()> {
        (**self).observe(round, turns, universe, events)
    }

    fn is_implemented(&self) -> bool {
        (**self).is_implemented()
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevNullViewer;

impl Viewer for DevNullViewer {
    fn observe(&mut self, _: u32, _: u32, _: &Universe, _: &[Event]) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Writes the maze and scores as text after every round.
#[derive(Debug)]
pub struct AsciiViewer<W> {
    out: W,
}

impl<W: Write> AsciiViewer<W> {
    /// Create a viewer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Viewer for AsciiViewer<W> {
    fn observe(
        &mut self,
        round: u32,
        turns: u32,
        universe: &Universe,
        events: &[Event],
    ) -> anyhow::Result<()> {
        writeln!(self.out, "Round {round} ({turns} turns)")?;
        writeln!(self.out, "{universe}")?;
        let scores: Vec<String> = universe
            .teams()
            .iter()
            .map(|t| format!("{}: {}", t.name, t.score))
            .collect();
        writeln!(self.out, "{}", scores.join(" - "))?;
        for event in events {
            if let Event::PlayerFailure { bot, cause } = event {
                writeln!(self.out, "bot {bot} failed: {cause}")?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Reports rounds and events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogViewer;

impl Viewer for LogViewer {
    fn observe(
        &mut self,
        round: u32,
        turns: u32,
        universe: &Universe,
        events: &[Event],
    ) -> anyhow::Result<()> {
        for event in events {
            debug!(round, ?event, "event");
        }
        info!(
            round,
            turns,
            scores = ?universe.scores(),
            food = universe.food().len(),
            "round finished"
        );
        Ok(())
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Snapshot of one finished round, as written by [`RecordingViewer`].
#[derive(Debug, Clone, Serialize)]
pub struct RoundRecord<'a> {
    /// Round index.
    pub round: u32,
    /// Turns played in the round.
    pub turns: u32,
    /// Maze in the layout grammar, bots at their current positions.
    pub layout: String,
    /// Position of every bot, by id.
    pub bots: Vec<Position>,
    /// Score of every team, by id.
    pub scores: Vec<u32>,
    /// Pellets still on the board.
    pub food_left: usize,
    /// What happened, in order.
    pub events: &'a [Event],
}

impl<'a> RoundRecord<'a> {
    /// Capture `universe` after a round.
    #[must_use]
    pub fn new(round: u32, turns: u32, universe: &Universe, events: &'a [Event]) -> Self {
        Self {
            round,
            turns,
            layout: universe.to_string(),
            bots: universe.bots().iter().map(|b| b.position).collect(),
            scores: universe.scores(),
            food_left: universe.food().len(),
            events,
        }
    }
}

/// Writes one JSON object per round, one per line, flushing after each.
#[derive(Debug)]
pub struct RecordingViewer<W> {
    out: W,
}

impl<W: Write> RecordingViewer<W> {
    /// Create a viewer writing JSON lines to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Viewer for RecordingViewer<W> {
    fn observe(
        &mut self,
        round: u32,
        turns: u32,
        universe: &Universe,
        events: &[Event],
    ) -> anyhow::Result<()> {
        let record = RoundRecord::new(round, turns, universe, events);
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        // a buffered dump is complete on disk after every round
        self.out.flush()?;
        Ok(())
    }

    fn is_implemented(&self) -> bool {
        true
    }
}
