#![no_main]

//! Move resolution fuzzer.
//!
//! Applies arbitrary move sequences to generated mazes and checks the
//! universe invariants after every move.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mazectf::game::{check_invariants, generate_layout, Move, Universe};

/// Structured input for move fuzzing.
#[derive(Arbitrary, Debug)]
struct MovesInput {
    /// Generator seed.
    seed: u64,
    /// Maze width offset.
    width: u8,
    /// Maze height offset.
    height: u8,
    /// Number of bot pairs.
    pairs: u8,
    /// `(bot, move)` pairs, reduced modulo the bot and move counts.
    moves: Vec<(u8, u8)>,
}

fuzz_target!(|input: MovesInput| {
    let width = 6 + u16::from(input.width % 26);
    let height = 4 + u16::from(input.height % 12);
    let bots = 2 * (1 + usize::from(input.pairs % 3));

    let Ok(layout) = generate_layout(input.seed, width, height, bots) else {
        return;
    };
    let mut universe = Universe::from_layout(layout);
    let mut scores = universe.scores();

    for &(bot, mv) in input.moves.iter().take(2000) {
        let bot = usize::from(bot) % bots;
        let mv = Move::ALL[usize::from(mv) % Move::ALL.len()];
        let from = universe.bots()[bot].position;
        let wall = from
            .step(mv)
            .is_none_or(|target| universe.maze().is_wall(target));

        universe.apply_move(bot, mv);

        if wall {
            assert_eq!(universe.bots()[bot].position, from);
        }
        let now = universe.scores();
        assert!(now.iter().zip(&scores).all(|(new, old)| new >= old));
        scores = now;

        let violations = check_invariants(&universe);
        assert!(
            violations.is_empty(),
            "Invariants violated after {:?} by bot {}: {:?}",
            mv,
            bot,
            violations
        );
    }
});
