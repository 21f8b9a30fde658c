//! Iterative mean-splitting threshold for a single frame.
//!
//! Samples are split at a candidate `T` into `v <= T` and `v > T`. Each side is
//! reduced to its sum divided by the sample count of the whole frame, so an empty
//! side contributes zero. The next candidate is `floor((m_low + m_high) / 2)`
//! and the solver stops at the first fixed point.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{CropError, Result};
use crate::models::{Frame, Intensity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdEstimator {
    pub max_iterations: usize,
}

impl ThresholdEstimator {
    pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Estimate a threshold starting from a candidate drawn uniformly from `[0, 255]`.
    pub fn estimate<T: Intensity, R: Rng + ?Sized>(&self, frame: &Frame<T>, rng: &mut R) -> Result<u32> {
        let initial = rng.random_range(0..=255u32);
        self.estimate_from(frame, initial)
    }

    /// Estimate a threshold from an explicit starting candidate.
    pub fn estimate_from<T: Intensity>(&self, frame: &Frame<T>, initial: u32) -> Result<u32> {
        let samples = frame.as_raw();
        if samples.is_empty() {
            return Err(CropError::EmptyVolume);
        }
        let count = samples.len() as f64;

        let mut current = initial;
        for _ in 0..self.max_iterations {
            let (low, high) = split_sums(samples, current);
            let m_low = low as f64 / count;
            let m_high = high as f64 / count;
            let next = ((m_low + m_high) / 2.0).floor() as u32;
            if next == current {
                return Ok(current);
            }
            current = next;
        }

        Err(CropError::ThresholdNotConverged {
            frame: None,
            iterations: self.max_iterations,
            last: current,
        })
    }
}

impl Default for ThresholdEstimator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ITERATIONS)
    }
}

fn split_sums<T: Intensity>(samples: &[T], threshold: u32) -> (u64, u64) {
    samples.iter().fold((0u64, 0u64), |(low, high), &s| {
        let v = s.level();
        if v <= threshold {
            (low + v as u64, high)
        } else {
            (low, high + v as u64)
        }
    })
}

/// Source of the solver's initial candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Fresh OS entropy for every frame.
    #[default]
    Entropy,
    /// Frame `i` uses a generator seeded from `seed + i`, independent of scheduling.
    Fixed(u64),
}

impl SeedStrategy {
    pub fn frame_rng(&self, index: usize) -> StdRng {
        match self {
            SeedStrategy::Entropy => StdRng::from_os_rng(),
            SeedStrategy::Fixed(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        }
    }
}

impl From<Option<u64>> for SeedStrategy {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(SeedStrategy::Entropy, SeedStrategy::Fixed)
    }
}
