//! Implements the Laplace mechanism.
//!
//! Noise is sampled by inverting the Laplace CDF at a single uniform draw
//! `u ∈ (-0.5, 0.5)`: `noise = -b·sign(u)·ln(1 - 2|u|)` with `b = Δ/ε`.
//! As `|u| → 0.5` the noise grows without bound. The uniform grid used by
//! `RandomSource::uniform` can produce `u = -0.5` exactly (with probability
//! 2^-53), where the logarithm is `-∞`; that draw is rejected and resampled.
//! Every accepted draw has `1 - 2|u| ≥ 2^-52`, so `|noise| ≤ 52·ln 2·b`.
//!
//! `LaplaceConfig::new` rejects parameters whose scale makes that bound
//! overflow, and `LaplaceConfig::apply` rejects true values too close to
//! `f64::MAX` for the bound to be added. Both checks run before any draw,
//! so every returned value is finite.

use serde::Serialize;

use crate::error::{MechanismError, Result};
use crate::utilities::params::{Epsilon, Sensitivity};
use crate::utilities::randomness::RandomSource;

/// Upper bound on `|noise| / b`, just above `52·ln 2 ≈ 36.04`.
const NOISE_BOUND_FACTOR: f64 = 37.0;

/// A validated Laplace mechanism: privacy parameter and query sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaplaceConfig {
    pub epsilon: Epsilon,
    pub sensitivity: Sensitivity,
}

impl LaplaceConfig {
    /// Create a new configuration.
    /// ## Errors
    /// Returns `InvalidEpsilon` or `InvalidSensitivity` if either parameter
    /// fails its check, and `ScaleOverflow` if `sensitivity / epsilon` is too
    /// large for the noise to be finite.
    pub fn new(epsilon: Epsilon, sensitivity: Sensitivity) -> Result<LaplaceConfig> {
        epsilon.check()?;
        sensitivity.check()?;
        let config = LaplaceConfig { epsilon, sensitivity };
        if !config.max_noise().is_finite() {
            return Err(MechanismError::ScaleOverflow {
                sensitivity: sensitivity.value(),
                epsilon: epsilon.value(),
            });
        }
        Ok(config)
    }

    /// The noise scale `b = sensitivity / epsilon`.
    pub fn scale(&self) -> f64 {
        self.sensitivity.value() / self.epsilon.value()
    }

    /// Bound on the magnitude of any noise sample.
    pub fn max_noise(&self) -> f64 {
        self.scale() * NOISE_BOUND_FACTOR
    }

    /// Variance of the noise, `2b²`.
    pub fn variance(&self) -> f64 {
        2.0 * self.scale().powi(2)
    }

    /// Expected absolute error `E|noise| = b`.
    pub fn expected_absolute_error(&self) -> f64 {
        self.scale()
    }

    /// Density of `Laplace(location, b)` at `x`. A zero scale yields a point
    /// mass, reported as `+∞` at `location` and `0` elsewhere.
    pub fn pdf(&self, x: f64, location: f64) -> f64 {
        let b = self.scale();
        let d = (x - location).abs();
        if b == 0.0 {
            return if d == 0.0 { f64::INFINITY } else { 0.0 };
        }
        (-d / b).exp() / (2.0 * b)
    }

    /// Draw one noise sample from `Laplace(0, b)`.
    pub fn noise<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        let u = loop {
            let u = rng.uniform()? - 0.5;
            if u.abs() < 0.5 {
                break u;
            }
            tracing::warn!(u, "uniform draw on the Laplace boundary; resampling");
        };
        let magnitude = (1.0 - 2.0 * u.abs()).ln();
        Ok(-self.scale() * 1f64.copysign(u) * magnitude)
    }

    /// Add noise to `true_value`.
    /// ## Errors
    /// Returns `NonFiniteInput` if `true_value` is NaN or infinite, and
    /// `OutputOverflow` if `|true_value| + max_noise()` is not finite.
    pub fn apply<R: RandomSource + ?Sized>(&self, true_value: f64, rng: &mut R) -> Result<f64> {
        if !true_value.is_finite() {
            return Err(MechanismError::NonFiniteInput { what: "true value", value: true_value });
        }
        if !(true_value.abs() + self.max_noise()).is_finite() {
            return Err(MechanismError::OutputOverflow { true_value, scale: self.scale() });
        }
        let noise = self.noise(rng)?;
        tracing::debug!(
            epsilon = self.epsilon.value(),
            scale = self.scale(),
            "laplace mechanism noise added"
        );
        Ok(true_value + noise)
    }
}

/// Implements the Laplace mechanism: returns `true_value` plus noise drawn
/// from `Laplace(0, sensitivity/epsilon)`. For neighbouring datasets whose
/// true answers differ by at most `sensitivity`, the output is
/// `epsilon`-differentially private.
/// ## Arguments
///   * `true_value`: the exact query answer
///   * `sensitivity`: bound on how far one record can move `true_value`
///   * `epsilon`: the privacy parameter
///   * `rng`: the random source
/// ## Errors
/// Returns `InvalidEpsilon`, `InvalidSensitivity`, `ScaleOverflow`,
/// `NonFiniteInput` or `OutputOverflow` before
/// drawing any randomness, and `RandomnessUnavailable` if `rng` fails.
/// ## Example
/// ```
/// use dpmech::{laplace_mechanism, Epsilon, SeededGenerator, Sensitivity};
///
/// let mut rng = SeededGenerator::from_seed(0);
/// let noisy = laplace_mechanism(40.0,
///                               Sensitivity::new(0.04).unwrap(),
///                               Epsilon::new(1.0).unwrap(),
///                               &mut rng).unwrap();
/// assert!(noisy.is_finite());
/// ```
pub fn laplace_mechanism<R: RandomSource + ?Sized>(true_value: f64, sensitivity: Sensitivity, epsilon: Epsilon, rng: &mut R) -> Result<f64> {
    LaplaceConfig::new(epsilon, sensitivity)?.apply(true_value, rng)
}
