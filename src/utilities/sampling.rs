//! Probability vectors and weighted categorical sampling.

use std::ops::Deref;

use serde::Serialize;

use crate::error::{MechanismError, Result};
use crate::utilities::randomness::RandomSource;

/// Tolerance on the sum of a `ProbabilityVector`.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Probabilities aligned with a candidate set. Entries are non-negative and
/// sum to one within `PROBABILITY_TOLERANCE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f64>);

impl ProbabilityVector {
    /// Normalize non-negative, finite weights with a positive, finite total.
    /// ## Errors
    /// Returns `InvalidWeights` or `EmptyCandidateSet` if `weights` cannot
    /// be normalized.
    pub(crate) fn from_weights(weights: Vec<f64>) -> Result<ProbabilityVector> {
        let total = checked_total(&weights)?;
        Ok(ProbabilityVector(weights.into_iter().map(|w| w / total).collect()))
    }

    /// True if every entry is non-negative and the entries sum to one
    /// within `tolerance`.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.0.iter().all(|p| *p >= 0.0) && (self.0.iter().sum::<f64>() - 1.0).abs() <= tolerance
    }

    /// Sample an index from this distribution.
    pub fn sample<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        normalized_sample(&self.0, rng)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for ProbabilityVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

/// Sample an index with probability proportional to `weights`.
///
/// Builds the cumulative sums of `weights`, draws one uniform value scaled to
/// the total, and binary-searches for the first bucket whose cumulative sum
/// exceeds the draw. Zero-weight entries are never selected.
/// ## Arguments
///   * `weights`: non-negative, finite weights with a positive sum
///   * `rng`: the random source; exactly one draw is taken
/// ## Returns
/// The sampled index.
/// ## Errors
/// Returns `EmptyCandidateSet` for no weights and `InvalidWeights` if any
/// weight is negative or not finite, or the total is zero or overflows. No
/// randomness is drawn in either case.
/// ## Example
/// ```
/// use dpmech::{normalized_sample, SeededGenerator};
/// let mut rng = SeededGenerator::from_seed(3);
/// let i = normalized_sample(&[0.0, 2.0, 0.0], &mut rng).unwrap();
/// assert_eq!(i, 1);
/// ```
pub fn normalized_sample<R: RandomSource + ?Sized>(weights: &[f64], rng: &mut R) -> Result<usize> {
    checked_total(weights)?;
    let mut cumulative = Vec::with_capacity(weights.len());
    let mut running = 0.0;
    for w in weights.iter() {
        running += w;
        cumulative.push(running);
    }

    let draw = rng.uniform()? * running;
    let index = cumulative.partition_point(|c| *c <= draw);
    tracing::trace!(draw, index, "categorical sample");

    // Rounding can leave `draw` at the total; fall back to the last
    // bucket with positive weight.
    if index >= weights.len() {
        return Ok(weights.iter().rposition(|w| *w > 0.0).unwrap_or(weights.len() - 1));
    }
    Ok(index)
}

/// Sum of `weights`, after checking they describe a distribution.
fn checked_total(weights: &[f64]) -> Result<f64> {
    if weights.is_empty() {
        return Err(MechanismError::EmptyCandidateSet);
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(MechanismError::InvalidWeights { reason: "weights must be finite and non-negative" });
    }
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(MechanismError::InvalidWeights { reason: "total weight must be positive and finite" });
    }
    Ok(total)
}
