//! Benchmarks for running complete games.
//!
//! This benchmarks the full game loop (worker round trips included) and the
//! bare move resolution underneath it.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mazectf::game::{generate_layout, Move, Universe, DEFAULT_LAYOUT};
use mazectf::master::{GameConfig, GameMaster};
use mazectf::player::builtin;
use mazectf::tournament::{play_match, TeamEntry, TournamentConfig};

/// Play one game of `player` against itself on the default layout.
fn run_game(player: &str, seed: u64, rounds: u32) -> u32 {
    let config = GameConfig {
        game_time: rounds,
        player_timeout: None,
        ..GameConfig::default()
    };
    let mut gm = GameMaster::with_config(DEFAULT_LAYOUT, 4, config).unwrap();
    for bot in 0..4 {
        gm.register_player(builtin(player, seed + bot as u64).unwrap(), bot)
            .unwrap();
    }
    gm.play().unwrap().rounds_played
}

fn bench_single_game(c: &mut Criterion) {
    c.bench_function("single_game_random_100", |b| {
        b.iter(|| black_box(run_game("random", black_box(42), 100)));
    });
}

fn bench_food_eaters(c: &mut Criterion) {
    c.bench_function("single_game_food_eater_300", |b| {
        b.iter(|| black_box(run_game("food_eater", black_box(42), 300)));
    });
}

fn bench_match(c: &mut Criterion) {
    let eaters = TeamEntry::new("eaters", |seed| {
        (0..2).filter_map(|i| builtin("food_eater", seed + i)).collect()
    });
    let randoms = TeamEntry::new("randoms", |seed| {
        (0..2).filter_map(|i| builtin("nq_random", seed + i)).collect()
    });
    let config = TournamentConfig {
        rounds: 100,
        player_timeout: None,
        ..TournamentConfig::default()
    };

    c.bench_function("tournament_match_100", |b| {
        b.iter(|| black_box(play_match(&eaters, &randoms, &config, black_box(7)).unwrap()));
    });
}

fn bench_apply_move(c: &mut Criterion) {
    // Move resolution alone, on a generated 32x16 maze
    let layout = generate_layout(3, 32, 16, 4).unwrap();
    let universe = Universe::from_layout(layout);

    c.bench_function("apply_move_1000", |b| {
        b.iter(|| {
            let mut u = universe.clone();
            for i in 0..1000usize {
                let mv = Move::ALL[i % Move::ALL.len()];
                black_box(u.apply_move(i % 4, mv));
            }
            u
        });
    });
}

criterion_group!(
    benches,
    bench_single_game,
    bench_food_eaters,
    bench_match,
    bench_apply_move
);
criterion_main!(benches);
