use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Single source of randomness for a generation run.
///
/// Implementations must be deterministic for a given seed; the generator
/// never reseeds a source mid-run.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn uniform_float(&mut self) -> f64;

    /// Sample from a normal distribution.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64;

    /// Uniform integer in `0..=max`.
    fn uniform_int(&mut self, max: u64) -> u64;

    /// Underlying engine, for faker-driven text.
    fn rng(&mut self) -> &mut dyn RngCore;

    /// Uniformly pick one element.
    ///
    /// # Panics
    ///
    /// Panics when `items` is empty.
    fn uniform_choice<'a, T>(&mut self, items: &'a [T]) -> &'a T
    where
        Self: Sized,
    {
        assert!(!items.is_empty(), "uniform_choice over an empty sequence");
        let index = self.uniform_int(items.len() as u64 - 1) as usize;
        &items[index]
    }
}

/// ChaCha8-backed source seeded once from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: ChaCha8Rng,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn uniform_float(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => mean,
        }
    }

    fn uniform_int(&mut self, max: u64) -> u64 {
        self.rng.random_range(0..=max)
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}
