//! Layout parsing.
//!
//! The layout grammar is a rectangular block of ASCII rows:
//!
//! ```text
//! ######
//! #0 . #
//! #.. 1#
//! ######
//! ```
//!
//! `#` is a wall, `.` a pellet, a space empty floor and a digit the spawn
//! cell of that bot. Leading and trailing whitespace on each row is ignored,
//! as are blank rows, so layouts can be indented inside Rust string literals.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::LayoutError;
use crate::game::{BotId, Maze, Position};

/// Four-bot default layout.
pub const DEFAULT_LAYOUT: &str = "\
####################
#0 . .#  ..  # .   #
#2 ###  .  #  # . .#
#  . . #    #### . #
# . ####    # . .  #
#. . #  #  .  ### 3#
#   . #  ..  #. . 1#
####################";

/// Two-bot layout small enough to reason about by hand.
pub const SMALL_LAYOUT: &str = "\
######
#0 . #
#.. 1#
######";

/// A parsed layout: the maze plus initial food and bot placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Wall grid.
    pub maze: Maze,
    /// Cells holding a pellet.
    pub food: BTreeSet<Position>,
    /// Spawn cell of each bot, indexed by bot id.
    pub bots: Vec<Position>,
}

impl Layout {
    /// Parse layout text expecting exactly `number_bots` bots.
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if rows differ in length, a character is
    /// outside the grammar, the bot digits are not exactly
    /// `0..number_bots` each appearing once, or the perimeter is not all
    /// wall.
    pub fn parse(text: &str, number_bots: usize) -> Result<Self, LayoutError> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| row.chars().collect())
            .collect();

        let Some(first) = rows.first() else {
            return Err(LayoutError::Empty);
        };
        let width = first.len();
        let height = rows.len();

        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != width {
                return Err(LayoutError::UnequalRows {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
        }

        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(LayoutError::TooLarge { width, height });
        };

        let mut walls = Vec::with_capacity(width * height);
        let mut food = BTreeSet::new();
        let mut bots: Vec<Option<Position>> = vec![None; number_bots];

        for (y, cells) in rows.iter().enumerate() {
            for (x, &ch) in cells.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let pos = Position::new(x as u16, y as u16);
                match ch {
                    '#' => walls.push(true),
                    '.' => {
                        walls.push(false);
                        food.insert(pos);
                    }
                    ' ' => walls.push(false),
                    _ => {
                        let Some(digit) = ch.to_digit(10) else {
                            return Err(LayoutError::InvalidCharacter { ch, x, y });
                        };
                        let bot = digit as BotId;
                        let slot = bots.get_mut(bot).ok_or(LayoutError::UnexpectedBot {
                            bot,
                            expected: number_bots,
                        })?;
                        if slot.is_some() {
                            return Err(LayoutError::DuplicateBot { bot });
                        }
                        *slot = Some(pos);
                        walls.push(false);
                    }
                }
            }
        }

        for y in 0..height {
            for x in 0..width {
                let on_edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                if on_edge && !walls[y * width + x] {
                    return Err(LayoutError::OpenPerimeter { x, y });
                }
            }
        }

        let bots = bots
            .into_iter()
            .enumerate()
            .map(|(bot, pos)| pos.ok_or(LayoutError::MissingBot { bot }))
            .collect::<Result<Vec<_>, _>>()?;

        let maze = Maze::new(w, h, walls).ok_or(LayoutError::Empty)?;

        Ok(Self { maze, food, bots })
    }

    /// Count the bot digits in layout text without validating it.
    #[must_use]
    pub fn count_bots(text: &str) -> usize {
        text.chars().filter(char::is_ascii_digit).count()
    }
}

impl fmt::Display for Layout {
    /// Render back into the layout grammar, spawn digits included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.maze.render_with(&self.food, |pos| {
            self.bots
                .iter()
                .position(|&spawn| spawn == pos)
                .and_then(|bot| char::from_digit(u32::try_from(bot).ok()?, 10))
        });
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_small_layout() {
        let layout = Layout::parse(SMALL_LAYOUT, 2).unwrap();
        assert_eq!(layout.maze.width(), 6);
        assert_eq!(layout.maze.height(), 4);
        assert_eq!(layout.bots, vec![Position::new(1, 1), Position::new(4, 2)]);
        let food: Vec<_> = layout.food.iter().copied().collect();
        assert_eq!(
            food,
            vec![Position::new(3, 1), Position::new(1, 2), Position::new(2, 2)]
        );
    }

    #[test]
    fn test_parse_indented_layout() {
        let text = "  ######
                      #0 . #
                      #.. 1#
                      ###### ";
        let layout = Layout::parse(text, 2).unwrap();
        assert_eq!(layout.to_string(), SMALL_LAYOUT);
    }

    #[test]
    fn test_spawn_cells_are_floor_without_food() {
        let layout = Layout::parse(SMALL_LAYOUT, 2).unwrap();
        for spawn in &layout.bots {
            assert!(layout.maze.is_floor(*spawn));
            assert!(!layout.food.contains(spawn));
        }
    }

    #[test]
    fn test_render_without_bots() {
        let layout = Layout::parse(SMALL_LAYOUT, 2).unwrap();
        assert_eq!(layout.maze.render(&layout.food), "######\n#  . #\n#..  #\n######");
    }

    #[test]
    fn test_default_layout_parses() {
        let layout = Layout::parse(DEFAULT_LAYOUT, 4).unwrap();
        assert_eq!(layout.maze.width(), 20);
        assert_eq!(layout.maze.height(), 8);
        assert_eq!(layout.food.len(), 22);
        assert_eq!(layout.to_string(), DEFAULT_LAYOUT);
    }

    #[test]
    fn test_empty_layout() {
        assert_eq!(Layout::parse("", 2), Err(LayoutError::Empty));
        assert_eq!(Layout::parse(" \n  \n", 2), Err(LayoutError::Empty));
    }

    #[test]
    fn test_unequal_rows() {
        let text = "######\n#0 1#\n######";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::UnequalRows {
                row: 1,
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_invalid_character() {
        let text = "#####\n#0x1#\n#####";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::InvalidCharacter { ch: 'x', x: 2, y: 1 })
        );
    }

    #[test]
    fn test_duplicate_bot() {
        let text = "#####\n#0 0#\n#1  #\n#####";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::DuplicateBot { bot: 0 })
        );
    }

    #[test]
    fn test_unexpected_bot() {
        let text = "#####\n#0 2#\n#1  #\n#####";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::UnexpectedBot { bot: 2, expected: 2 })
        );
    }

    #[test]
    fn test_missing_bot() {
        let text = "#####\n#0  #\n#####";
        assert_eq!(Layout::parse(text, 2), Err(LayoutError::MissingBot { bot: 1 }));
    }

    #[test]
    fn test_open_perimeter() {
        let text = "#####\n#0 1 \n#####";
        // trailing whitespace is trimmed, so make the hole explicit
        assert!(matches!(
            Layout::parse(text, 2),
            Err(LayoutError::UnequalRows { .. })
        ));

        let text = "#####\n.0 1#\n#####";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::OpenPerimeter { x: 0, y: 1 })
        );

        let text = "##.##\n#0 1#\n#####";
        assert_eq!(
            Layout::parse(text, 2),
            Err(LayoutError::OpenPerimeter { x: 2, y: 0 })
        );
    }

    #[test]
    fn test_count_bots() {
        assert_eq!(Layout::count_bots(DEFAULT_LAYOUT), 4);
        assert_eq!(Layout::count_bots(SMALL_LAYOUT), 2);
    }
}
