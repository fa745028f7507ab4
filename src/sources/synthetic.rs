//! Synthetic market data.
//!
//! Adapters that cannot read authoritative figures draw them from a
//! [`Sampler`]. Production wires a [`RandomSampler`]; tests substitute a
//! [`FixedSampler`] so every generated figure is known in advance.

use std::sync::Arc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform samples in `[0, 1)`.
pub trait Sampler: Send + Sync {
    fn next_unit(&self) -> f64;
}

pub struct RandomSampler {
    rng: Mutex<StdRng>,
}

impl RandomSampler {
    pub fn new() -> Self {
        RandomSampler {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible stream for simulations.
    pub fn seeded(seed: u64) -> Self {
        RandomSampler {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn next_unit(&self) -> f64 {
        self.rng.lock().random::<f64>()
    }
}

/// Always returns the same sample.
#[derive(Clone, Copy, Debug)]
pub struct FixedSampler(pub f64);

impl Sampler for FixedSampler {
    fn next_unit(&self) -> f64 {
        self.0.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

const WALLET_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Turns unit samples into the shapes adapters need.
#[derive(Clone)]
pub struct Synthesizer {
    sampler: Arc<dyn Sampler>,
}

impl Synthesizer {
    pub fn new(sampler: Arc<dyn Sampler>) -> Self {
        Synthesizer { sampler }
    }

    pub fn unit(&self) -> f64 {
        self.sampler.next_unit()
    }

    /// Uniform in `[min, max)`.
    pub fn between(&self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.unit()
    }

    /// True with probability `p`.
    pub fn chance(&self, p: f64) -> bool {
        self.unit() < p
    }

    /// Uniform integer in `[min, max]`.
    pub fn whole(&self, min: u64, max: u64) -> u64 {
        let span = (max - min + 1) as f64;
        (min + (self.unit() * span) as u64).min(max)
    }

    /// `wallet` followed by six base-36 characters.
    pub fn wallet(&self) -> String {
        let suffix: String = (0..6)
            .map(|_| {
                let idx = self.whole(0, WALLET_ALPHABET.len() as u64 - 1) as usize;
                WALLET_ALPHABET[idx] as char
            })
            .collect();
        format!("wallet{}", suffix)
    }
}
