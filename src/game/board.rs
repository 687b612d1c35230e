use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

use super::variant::GameType;

/// Board source for one round.
///
/// Every board of a round comes from a single generator seeded with the
/// round's board seed, so replaying the same seed with the same player
/// order reproduces the same boards. The seed itself is drawn from the OS
/// backed thread rng; `StdRng` is not a promise of unpredictability to an
/// adversary who learns the seed.
pub struct BoardGenerator {
    rng: StdRng,
}

impl BoardGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn next_board(&mut self, game_type: GameType) -> Vec<u8> {
        generate_board(game_type, &mut self.rng)
    }
}

/// Builds one board as an ordered sequence of cell values.
pub fn generate_board<R: Rng + ?Sized>(game_type: GameType, rng: &mut R) -> Vec<u8> {
    match game_type {
        // Five columns of fifteen; column-major, each column ascending.
        GameType::Classic75 | GameType::Pattern => (0..5u8)
            .flat_map(|column| {
                let start = column * 15 + 1;
                draw_distinct(start..=start + 14, 5, &mut *rng)
            })
            .collect(),
        // Nine columns of ten, 1-3 numbers in each.
        GameType::Strip90 => (0..9u8)
            .flat_map(|column| {
                let start = column * 10 + 1;
                let count = rng.random_range(1..=3);
                draw_distinct(start..=start + 9, count, &mut *rng)
            })
            .collect(),
        GameType::Speed30 => draw_distinct(1..=30, 9, rng),
    }
}

/// Draws `count` distinct values from `range` without replacement, ascending.
fn draw_distinct<R: Rng + ?Sized>(range: RangeInclusive<u8>, count: usize, rng: &mut R) -> Vec<u8> {
    let mut pool: Vec<u8> = range.collect();
    pool.shuffle(rng);
    pool.truncate(count);
    pool.sort_unstable();
    pool
}
