//! Error types shared by the mechanisms and their parameter types.

use thiserror::Error;

/// Errors reported by the mechanisms. Every input error is detected before
/// any randomness is drawn.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MechanismError {
    /// The privacy parameter was not a positive, finite real.
    #[error("epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),

    /// The sensitivity was negative or not finite.
    #[error("sensitivity must be non-negative and finite, got {0}")]
    InvalidSensitivity(f64),

    /// The exponential mechanism was called without candidates.
    #[error("candidate set is empty")]
    EmptyCandidateSet,

    /// The maximum utility is exactly zero, so utilities cannot be normalized by it.
    #[error("maximum utility is zero; utilities cannot be normalized")]
    DegenerateUtilityNormalization,

    /// A utility or true value was NaN or infinite.
    #[error("{what} must be finite, got {value}")]
    NonFiniteInput { what: &'static str, value: f64 },

    /// Sampling weights were negative, not finite, or had no positive finite total.
    #[error("invalid sampling weights: {reason}")]
    InvalidWeights { reason: &'static str },

    /// `sensitivity / epsilon` is too large for the noise to stay finite.
    #[error("noise scale overflows for sensitivity {sensitivity} and epsilon {epsilon}")]
    ScaleOverflow { sensitivity: f64, epsilon: f64 },

    /// The true value is so large that adding noise could overflow.
    #[error("true value {true_value} plus noise of scale {scale} may overflow")]
    OutputOverflow { true_value: f64, scale: f64 },

    /// Two candidates share the same label.
    #[error("candidate at index {index} repeats an earlier label")]
    DuplicateLabel { index: usize },

    /// A trial run was requested with zero trials.
    #[error("number of trials must be at least 1, got {0}")]
    InvalidTrialCount(usize),

    /// A trial configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The entropy source failed to produce random bytes.
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(String),
}

impl From<openssl::error::ErrorStack> for MechanismError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        MechanismError::RandomnessUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for MechanismError {
    fn from(err: serde_json::Error) -> Self {
        MechanismError::InvalidConfig(err.to_string())
    }
}

/// Result type for mechanism operations.
pub type Result<T> = std::result::Result<T, MechanismError>;
