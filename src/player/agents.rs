//! Built-in players.

use std::collections::VecDeque;

use anyhow::bail;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::game::{Move, Position, UnknownMove};
use crate::player::{BotView, Player};

/// Always stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoppingPlayer;

impl Player for StoppingPlayer {
    fn get_move(&mut self, _view: &BotView<'_>) -> anyhow::Result<Move> {
        Ok(Move::Stop)
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Plays a fixed list of moves.
///
/// Moves are taken from the back of the list, so `[east, south]` plays
/// `south` first. Once the list is empty every further request fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    moves: Vec<Move>,
}

impl ScriptedPlayer {
    /// Create a player that pops its moves from the back of `moves`.
    #[must_use]
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// Parse a comma or whitespace separated list of move names.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMove`] for the first name that is not a move.
    pub fn parse(script: &str) -> Result<Self, UnknownMove> {
        let moves = script
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()?;
        Ok(Self::new(moves))
    }

    /// Moves not played yet, next one last.
    #[must_use]
    pub fn remaining(&self) -> &[Move] {
        &self.moves
    }
}

impl Player for ScriptedPlayer {
    fn get_move(&mut self, _view: &BotView<'_>) -> anyhow::Result<Move> {
        match self.moves.pop() {
            Some(mv) => Ok(mv),
            None => bail!("script exhausted"),
        }
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Picks uniformly among the legal moves, `Stop` included.
#[derive(Debug, Clone)]
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    /// Create a player with its own seeded generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn get_move(&mut self, view: &BotView<'_>) -> anyhow::Result<Move> {
        Ok(view
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Move::Stop))
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Not-quite random: never stops and never turns back unless it must.
#[derive(Debug, Clone)]
pub struct NqRandomPlayer {
    rng: StdRng,
    last: Option<Move>,
}

impl NqRandomPlayer {
    /// Create a player with its own seeded generator.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }
}

impl Player for NqRandomPlayer {
    fn get_move(&mut self, view: &BotView<'_>) -> anyhow::Result<Move> {
        let moving: Vec<Move> = view
            .legal_moves()
            .into_iter()
            .filter(|&mv| mv != Move::Stop)
            .collect();
        let forward: Vec<Move> = moving
            .iter()
            .copied()
            .filter(|&mv| self.last.is_none_or(|last| mv != last.reverse()))
            .collect();

        let candidates = if forward.is_empty() { &moving } else { &forward };
        let mv = candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Move::Stop);
        self.last = Some(mv);
        Ok(mv)
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

/// Walks the shortest path to the nearest pellet it may eat.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoodEaterPlayer;

impl FoodEaterPlayer {
    /// First step of a shortest path from the bot to any enemy pellet.
    fn first_step(view: &BotView<'_>) -> Option<Move> {
        let maze = view.maze();
        let start = view.position();
        let targets = view.enemy_food();
        if targets.is_empty() {
            return None;
        }

        let mut first: Vec<Option<Move>> = vec![None; maze.positions().count()];
        let index = |pos: Position| usize::from(pos.y) * usize::from(maze.width()) + usize::from(pos.x);
        let mut seen = vec![false; first.len()];
        seen[index(start)] = true;
        let mut queue = VecDeque::from([start]);

        while let Some(pos) = queue.pop_front() {
            if targets.contains(&pos) {
                return first[index(pos)];
            }
            for mv in maze.legal_moves(pos) {
                let Some(next) = pos.step(mv) else { continue };
                if mv == Move::Stop || seen[index(next)] {
                    continue;
                }
                seen[index(next)] = true;
                first[index(next)] = first[index(pos)].or(Some(mv));
                queue.push_back(next);
            }
        }
        None
    }
}

impl Player for FoodEaterPlayer {
    fn get_move(&mut self, view: &BotView<'_>) -> anyhow::Result<Move> {
        Ok(Self::first_step(view).unwrap_or(Move::Stop))
    }

    fn is_implemented(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Universe, DEFAULT_LAYOUT, SMALL_LAYOUT};

    fn small() -> Universe {
        Universe::create(SMALL_LAYOUT, 2).unwrap()
    }

    #[test]
    fn test_stopping_player() {
        let universe = small();
        let view = BotView::new(&universe, 0).unwrap();
        assert_eq!(StoppingPlayer.get_move(&view).unwrap(), Move::Stop);
    }

    #[test]
    fn test_scripted_player_pops_from_back() {
        let universe = small();
        let view = BotView::new(&universe, 0).unwrap();
        let mut player = ScriptedPlayer::new(vec![Move::East, Move::South]);
        assert_eq!(player.get_move(&view).unwrap(), Move::South);
        assert_eq!(player.get_move(&view).unwrap(), Move::East);
        assert!(player.get_move(&view).is_err());
    }

    #[test]
    fn test_scripted_player_parse() {
        let player = ScriptedPlayer::parse("east, West stop\nnorth").unwrap();
        assert_eq!(
            player.remaining(),
            &[Move::East, Move::West, Move::Stop, Move::North]
        );
        assert_eq!(
            ScriptedPlayer::parse("east,up").unwrap_err(),
            UnknownMove("up".to_string())
        );
    }

    #[test]
    fn test_random_player_is_seeded_and_legal() {
        let universe = Universe::create(DEFAULT_LAYOUT, 4).unwrap();
        let view = BotView::new(&universe, 0).unwrap();
        let mut a = RandomPlayer::new(9);
        let mut b = RandomPlayer::new(9);
        for _ in 0..50 {
            let mv = a.get_move(&view).unwrap();
            assert_eq!(mv, b.get_move(&view).unwrap());
            assert!(view.legal_moves().contains(&mv));
        }
    }

    #[test]
    fn test_nq_random_player_never_stops_when_it_can_move() {
        let universe = Universe::create(DEFAULT_LAYOUT, 4).unwrap();
        let view = BotView::new(&universe, 1).unwrap();
        let mut player = NqRandomPlayer::new(5);
        for _ in 0..20 {
            assert_ne!(player.get_move(&view).unwrap(), Move::Stop);
        }
    }

    #[test]
    fn test_nq_random_player_reverses_only_when_forced() {
        // dead end: the only way out is back
        let text = "#####\n#0 1#\n#####";
        let universe = Universe::create(text, 2).unwrap();
        let view = BotView::new(&universe, 0).unwrap();
        let mut player = NqRandomPlayer::new(1);
        player.last = Some(Move::West);
        assert_eq!(player.get_move(&view).unwrap(), Move::East);
    }

    #[test]
    fn test_food_eater_heads_for_enemy_food() {
        let universe = small();
        // bot 0 at (1, 1); the only enemy pellet is (3, 1)
        let view = BotView::new(&universe, 0).unwrap();
        assert_eq!(FoodEaterPlayer.get_move(&view).unwrap(), Move::East);
        // bot 1 at (4, 2); nearest enemy pellet is (2, 2)
        let view = BotView::new(&universe, 1).unwrap();
        assert_eq!(FoodEaterPlayer.get_move(&view).unwrap(), Move::West);
    }

    #[test]
    fn test_food_eater_stops_without_targets() {
        let mut universe = small();
        universe.apply_move(0, Move::East);
        universe.apply_move(0, Move::East);
        let view = BotView::new(&universe, 0).unwrap();
        assert_eq!(FoodEaterPlayer.get_move(&view).unwrap(), Move::Stop);
    }
}
