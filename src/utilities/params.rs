//! Privacy parameters.
//!
//! `Epsilon` and `Sensitivity` are validated on construction, so a mechanism
//! that receives them only needs to re-`check()` them before drawing
//! randomness.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MechanismError, Result};

/// The privacy parameter epsilon. Smaller values give stronger privacy.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Epsilon(f64);

impl Epsilon {
    /// Create a new privacy parameter.
    /// ## Errors
    /// Returns `InvalidEpsilon` unless `epsilon` is positive and finite.
    /// ## Example
    /// ```
    /// use dpmech::Epsilon;
    /// let epsilon = Epsilon::new(1.0).unwrap();
    /// assert!(Epsilon::new(0.0).is_err());
    /// ```
    pub fn new(epsilon: f64) -> Result<Epsilon> {
        let e = Epsilon(epsilon);
        e.check()?;
        Ok(e)
    }

    /// Check that the parameter is positive and finite.
    pub fn check(&self) -> Result<()> {
        if self.0.is_finite() && self.0 > 0.0 {
            Ok(())
        } else {
            Err(MechanismError::InvalidEpsilon(self.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// The qualitative privacy level of this parameter.
    pub fn privacy_level(&self) -> PrivacyLevel {
        PrivacyLevel::classify(*self)
    }
}

impl fmt::Display for Epsilon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ε={}", self.0)
    }
}

/// The sensitivity of a query: how far one record can move its true answer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Sensitivity(f64);

impl Sensitivity {
    /// Create a new sensitivity.
    /// ## Errors
    /// Returns `InvalidSensitivity` if `sensitivity` is negative or not finite.
    pub fn new(sensitivity: f64) -> Result<Sensitivity> {
        let s = Sensitivity(sensitivity);
        s.check()?;
        Ok(s)
    }

    /// Sensitivity of the mean of `n` values clamped to `[lower, upper]`,
    /// i.e. `(upper - lower) / n`.
    /// ## Example
    /// ```
    /// use dpmech::Sensitivity;
    /// // Mean age of 1000 employees aged 20 to 60.
    /// let s = Sensitivity::bounded_mean(20.0, 60.0, 1000).unwrap();
    /// assert!((s.value() - 0.04).abs() < 1e-12);
    /// ```
    /// ## Errors
    /// Returns `InvalidSensitivity` if `upper < lower`, either bound is not
    /// finite, or `n` is zero.
    pub fn bounded_mean(lower: f64, upper: f64, n: usize) -> Result<Sensitivity> {
        if n == 0 {
            return Err(MechanismError::InvalidSensitivity(f64::INFINITY));
        }
        Sensitivity::new((upper - lower) / n as f64)
    }

    /// Check that the sensitivity is non-negative and finite.
    pub fn check(&self) -> Result<()> {
        if self.0.is_finite() && self.0 >= 0.0 {
            Ok(())
        } else {
            Err(MechanismError::InvalidSensitivity(self.0))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Qualitative privacy tier used to label a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrivacyLevel {
    Strong,
    Moderate,
    Weak,
}

/// Inclusive upper epsilon bound for each tier, in increasing order.
/// Anything above the last bound is `Weak`.
const PRIVACY_TIERS: [(f64, PrivacyLevel); 2] = [
    (0.1, PrivacyLevel::Strong),
    (1.0, PrivacyLevel::Moderate),
];

impl PrivacyLevel {
    /// Map epsilon to its tier: `ε ≤ 0.1` is strong, `0.1 < ε ≤ 1` moderate,
    /// and anything larger weak.
    /// ## Example
    /// ```
    /// use dpmech::{Epsilon, PrivacyLevel};
    /// let level = PrivacyLevel::classify(Epsilon::new(0.5).unwrap());
    /// assert_eq!(level, PrivacyLevel::Moderate);
    /// ```
    pub fn classify(epsilon: Epsilon) -> PrivacyLevel {
        PRIVACY_TIERS
            .iter()
            .find(|(bound, _)| epsilon.value() <= *bound)
            .map(|(_, level)| *level)
            .unwrap_or(PrivacyLevel::Weak)
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrivacyLevel::Strong => "Strong Privacy",
            PrivacyLevel::Moderate => "Moderate Privacy",
            PrivacyLevel::Weak => "Weaker Privacy",
        }
    }

    /// Effect on the exponential mechanism's selection distribution.
    pub fn selection_hint(&self) -> Option<&'static str> {
        match self {
            PrivacyLevel::Strong => Some("more uniform distribution"),
            PrivacyLevel::Moderate => None,
            PrivacyLevel::Weak => Some("closer to original distribution"),
        }
    }

    /// Effect on the amount of Laplace noise.
    pub fn noise_hint(&self) -> Option<&'static str> {
        match self {
            PrivacyLevel::Strong => Some("high noise"),
            PrivacyLevel::Moderate => None,
            PrivacyLevel::Weak => Some("low noise"),
        }
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
