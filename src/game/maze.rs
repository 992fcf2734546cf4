//! Maze geometry: positions, the wall grid, and team zones.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::game::Move;

/// A cell position in the maze.
///
/// Ordered row-major (by `y`, then `x`) so sets of positions iterate in
/// reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    /// Row.
    pub y: u16,
    /// Column.
    pub x: u16,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { y, x }
    }

    /// The position one `mv` away, or `None` if it would leave the
    /// coordinate range.
    #[must_use]
    pub fn step(self, mv: Move) -> Option<Self> {
        let (dx, dy) = mv.delta();
        Some(Self::new(
            self.x.checked_add_signed(dx)?,
            self.y.checked_add_signed(dy)?,
        ))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis along which the maze is split into team zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// Zones are column ranges (maze wider than tall).
    Columns,
    /// Zones are row ranges (maze taller than wide).
    Rows,
}

/// A contiguous band of the maze defended by one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Axis the band runs across.
    pub axis: Axis,
    /// First column/row of the band.
    pub start: u16,
    /// Last column/row of the band (inclusive).
    pub end: u16,
}

impl Zone {
    /// Split a `width` x `height` grid into two halves along its long axis.
    ///
    /// The first half gets `len / 2` lines, the second the remainder.
    #[must_use]
    pub fn halves(width: u16, height: u16) -> [Zone; 2] {
        let (axis, len) = if width >= height {
            (Axis::Columns, width)
        } else {
            (Axis::Rows, height)
        };
        let split = len / 2;
        [
            Zone {
                axis,
                start: 0,
                end: split.saturating_sub(1),
            },
            Zone {
                axis,
                start: split,
                end: len.saturating_sub(1),
            },
        ]
    }

    /// Check if a position lies in this zone.
    #[must_use]
    pub const fn contains(&self, pos: Position) -> bool {
        let line = match self.axis {
            Axis::Columns => pos.x,
            Axis::Rows => pos.y,
        };
        line >= self.start && line <= self.end
    }
}

/// The immutable wall/floor grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    /// Width in cells.
    width: u16,
    /// Height in cells.
    height: u16,
    /// Wall flags in row-major order.
    walls: Vec<bool>,
}

impl Maze {
    /// Create a maze from row-major wall flags.
    ///
    /// Returns `None` if the flag count does not match the dimensions or a
    /// dimension is zero.
    #[must_use]
    pub fn new(width: u16, height: u16, walls: Vec<bool>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        if walls.len() != usize::from(width) * usize::from(height) {
            return None;
        }
        Some(Self {
            width,
            height,
            walls,
        })
    }

    /// Width of the maze.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height of the maze.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Check if a position is within the grid.
    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x))
    }

    /// Check if a position is a wall. Anything outside the grid counts as wall.
    #[must_use]
    pub fn is_wall(&self, pos: Position) -> bool {
        self.index(pos).is_none_or(|idx| self.walls[idx])
    }

    /// Check if a position is walkable floor.
    #[must_use]
    pub fn is_floor(&self, pos: Position) -> bool {
        !self.is_wall(pos)
    }

    /// Iterate over all positions in reading order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Position::new(x, y)))
    }

    /// Iterate over all floor positions in reading order.
    pub fn floor(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|&pos| self.is_floor(pos))
    }

    /// Moves from `pos` that do not run into a wall, `Stop` included.
    #[must_use]
    pub fn legal_moves(&self, pos: Position) -> Vec<Move> {
        Move::ALL
            .into_iter()
            .filter(|&mv| pos.step(mv).is_some_and(|target| self.is_floor(target)))
            .collect()
    }

    /// The two team zones of this maze.
    #[must_use]
    pub fn zones(&self) -> [Zone; 2] {
        Zone::halves(self.width, self.height)
    }

    /// Render walls and food in the layout grammar, one line per row.
    ///
    /// Floor without food (bot spawns included) renders as a space.
    #[must_use]
    pub fn render(&self, food: &BTreeSet<Position>) -> String {
        self.render_with(food, |_| None)
    }

    /// Render with an overlay: `overlay` may claim a floor cell with its own
    /// character, which then wins over food.
    pub(crate) fn render_with(
        &self,
        food: &BTreeSet<Position>,
        overlay: impl Fn(Position) -> Option<char>,
    ) -> String {
        let mut out = String::with_capacity((usize::from(self.width) + 1) * usize::from(self.height));
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let ch = if self.is_wall(pos) {
                    '#'
                } else if let Some(ch) = overlay(pos) {
                    ch
                } else if food.contains(&pos) {
                    '.'
                } else {
                    ' '
                };
                out.push(ch);
            }
        }
        out
    }
}
