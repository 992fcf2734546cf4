//! Deterministic layout generation.
//!
//! Generated mazes are point-symmetric around their centre, so both teams
//! get the same geometry, food and spawn placement mirrored. The floor is
//! always a single connected region and the perimeter is always wall.

use std::collections::{BTreeSet, VecDeque};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::error::LayoutError;
use crate::game::{Layout, Maze, Position};

/// Chance that an interior cell pair becomes wall.
const WALL_DENSITY: f64 = 0.3;

/// Chance that a free home cell (and its mirror) gets a pellet.
const FOOD_DENSITY: f64 = 0.25;

/// Largest bot count the layout grammar can express with single digits.
const MAX_BOTS: usize = 10;

/// Error type for layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapGenError {
    /// Bots must split evenly between the two teams.
    #[error("need an even number of bots between 2 and {MAX_BOTS}, got {0}")]
    InvalidBotCount(usize),
    /// The grid cannot hold an interior.
    #[error("maze of {width}x{height} is too small")]
    TooSmall {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Not enough free cells in a home zone for spawns and food.
    #[error("no room for {bots} bots and food in a {width}x{height} maze")]
    NoRoom {
        /// Requested bots.
        bots: usize,
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// The generated text did not parse back.
    #[error("generated layout is invalid: {0}")]
    Layout(#[from] LayoutError),
}

/// Generate a layout with `number_bots` bots.
///
/// # Arguments
///
/// * `seed` - Random seed for deterministic generation
/// * `width` - Maze width in cells, perimeter included
/// * `height` - Maze height in cells, perimeter included
/// * `number_bots` - Even number of bots (2-10)
///
/// # Errors
///
/// Returns an error if the bot count is invalid or the maze is too small to
/// place every spawn plus at least one pellet per side.
pub fn generate_layout(
    seed: u64,
    width: u16,
    height: u16,
    number_bots: usize,
) -> Result<Layout, MapGenError> {
    if !(2..=MAX_BOTS).contains(&number_bots) || number_bots % 2 != 0 {
        return Err(MapGenError::InvalidBotCount(number_bots));
    }
    if width < 4 || height < 3 {
        return Err(MapGenError::TooSmall { width, height });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let walls = carve_walls(usize::from(width), usize::from(height), &mut rng);
    let maze = Maze::new(width, height, walls).ok_or(MapGenError::TooSmall { width, height })?;

    let [home, _] = maze.zones();
    let mut free: Vec<Position> = maze.floor().filter(|&pos| home.contains(pos)).collect();
    let per_team = number_bots / 2;
    if free.len() <= per_team {
        return Err(MapGenError::NoRoom {
            bots: number_bots,
            width,
            height,
        });
    }
    free.shuffle(&mut rng);
    let (spawns, rest) = free.split_at(per_team);

    let mut bots = vec![Position::new(0, 0); number_bots];
    for (i, &spawn) in spawns.iter().enumerate() {
        bots[2 * i] = spawn;
        bots[2 * i + 1] = mirror(spawn, width, height);
    }

    let mut food = BTreeSet::new();
    for &pos in rest {
        if rng.gen_bool(FOOD_DENSITY) {
            food.insert(pos);
            food.insert(mirror(pos, width, height));
        }
    }
    if food.is_empty() {
        // rest is non-empty, checked above
        let pos = rest[0];
        food.insert(pos);
        food.insert(mirror(pos, width, height));
    }

    let generated = Layout { maze, food, bots };
    Ok(Layout::parse(&generated.to_string(), number_bots)?)
}

/// Point reflection through the centre of the grid.
fn mirror(pos: Position, width: u16, height: u16) -> Position {
    Position::new(width - 1 - pos.x, height - 1 - pos.y)
}

/// Build a walled grid, adding symmetric interior wall pairs in random order
/// and undoing any pair that would disconnect the floor.
fn carve_walls(width: usize, height: usize, rng: &mut StdRng) -> Vec<bool> {
    let cells = width * height;
    let mut walls: Vec<bool> = (0..cells)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            x == 0 || y == 0 || x == width - 1 || y == height - 1
        })
        .collect();

    // index i mirrors to cells - 1 - i; visit each pair once
    let mut candidates: Vec<usize> = (0..=(cells - 1) / 2).filter(|&i| !walls[i]).collect();
    candidates.shuffle(rng);

    for i in candidates {
        if !rng.gen_bool(WALL_DENSITY) {
            continue;
        }
        let m = cells - 1 - i;
        walls[i] = true;
        walls[m] = true;
        if !is_connected(&walls, width) {
            walls[i] = false;
            walls[m] = false;
        }
    }
    walls
}

/// Check that all floor cells form one 4-connected region with at least
/// two cells.
fn is_connected(walls: &[bool], width: usize) -> bool {
    let floor = walls.iter().filter(|&&w| !w).count();
    let Some(start) = walls.iter().position(|&w| !w) else {
        return false;
    };
    if floor < 2 {
        return false;
    }

    let mut seen = vec![false; walls.len()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    let mut reached = 0;
    while let Some(i) = queue.pop_front() {
        reached += 1;
        // perimeter is wall, so interior neighbours never leave the grid
        for next in [i - width, i + width, i - 1, i + 1] {
            if !walls[next] && !seen[next] {
                seen[next] = true;
                queue.push_back(next);
            }
        }
    }
    reached == floor
}
