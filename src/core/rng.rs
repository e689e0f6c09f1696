//! Deterministic random number generation for simulated players.
//!
//! The match engine itself is deterministic and never draws random numbers.
//! Only bots do, and each bot gets its own forked stream so adding a bot
//! never changes another bot's choices.
//!
//! ```
//! use pick_or_perish::core::GameRng;
//!
//! let mut rng = GameRng::new(42);
//! let mut bot_a = rng.fork();
//! let mut bot_b = rng.fork();
//!
//! let a = bot_a.gen_value(100);
//! assert!((0..=100).contains(&a));
//!
//! // Same seed, same forks, same picks.
//! let mut again = GameRng::new(42);
//! assert_eq!(again.fork().gen_value(100), a);
//! # let _ = bot_b.gen_value(100);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seedable, forkable RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    fork_counter: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// Seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream. The n-th fork of a seed is always the same.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        self.fork_counter += 1;
        let fork_seed = self
            .seed
            .wrapping_add(self.fork_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self::new(fork_seed)
    }

    /// Uniform value in `0..=max`.
    pub fn gen_value(&mut self, max: i32) -> i32 {
        self.inner.gen_range(0..=max.max(0))
    }

    /// Uniform offset in `-spread..=spread`.
    pub fn gen_jitter(&mut self, spread: i32) -> i32 {
        let spread = spread.saturating_abs();
        self.inner.gen_range(-spread..=spread)
    }

    /// Random boolean with the given probability of `true`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }
}
