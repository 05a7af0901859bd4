//! # Differential Privacy Mechanisms Crate
//! Implements the exponential mechanism and the Laplace mechanism over
//! floating point utilities and query answers, together with validated
//! privacy parameters, injectable randomness and repeated-trial summaries.
//!
//! **Status:** reference implementation for demonstrations. Floating point
//! mechanisms are known to leak through rounding; do not use for production
//! releases of sensitive data.
//! ## Background
//! The exponential mechanism selects one of several candidates with
//! probability proportional to `exp(ε·u/2)`. Here each utility `u` is first
//! divided by the *largest utility in the candidate set* rather than by the
//! sensitivity of the utility function. This matches the behaviour the
//! mechanism has always had, but differs from the textbook mechanism: the
//! selection probabilities depend on the candidate set's maximum, and when
//! every utility is negative the ordering inverts.
//!
//! The Laplace mechanism adds noise drawn from `Laplace(0, Δ/ε)` to a scalar
//! query answer with sensitivity `Δ`.
//!
//! Every mechanism takes its random source explicitly. A `SeededGenerator`
//! makes runs bit-for-bit reproducible; independent workers should each own
//! their own source.
//! ## Details
//! ### Example Usage
//! **Classifying a privacy parameter**
//! ```
//! use dpmech::{Epsilon, PrivacyLevel};
//! let epsilon = Epsilon::new(0.05).unwrap();
//! assert_eq!(epsilon.privacy_level(), PrivacyLevel::Strong);
//! ```
//! **Running the exponential mechanism**
//! ```
//! use dpmech::{exponential_mechanism, Candidate, Epsilon, SeededGenerator};
//!
//! let candidates = vec![
//!     Candidate::new("Free Lunch", 120.0),
//!     Candidate::new("Gym Membership", 80.0),
//!     Candidate::new("Extra Paid Leave", 60.0),
//! ];
//! let mut rng = SeededGenerator::from_seed(42);
//! let selection = exponential_mechanism(&candidates, Epsilon::new(1.0).unwrap(), &mut rng).unwrap();
//! println!("{} {:?}", selection.outcome, &selection.probabilities[..]);
//! ```
//! **Running the Laplace mechanism**
//! ```
//! use dpmech::{laplace_mechanism, Epsilon, GeneratorOpenSSL, Sensitivity};
//!
//! let sensitivity = Sensitivity::bounded_mean(20.0, 60.0, 1000).unwrap();
//! let mut rng = GeneratorOpenSSL {};
//! let noisy_mean = laplace_mechanism(40.0, sensitivity, Epsilon::new(1.0).unwrap(), &mut rng).unwrap();
//! ```

/// Error types
pub mod error;
/// Differential Privacy Mechanisms
pub mod mechanisms;
/// Repeated-trial summaries
pub mod trials;
/// Differential Privacy Utilities
pub mod utilities;

pub use error::{MechanismError, Result};
pub use mechanisms::exponential::{exponential_mechanism, exponential_probabilities, Candidate, Selection};
pub use mechanisms::laplace::{laplace_mechanism, LaplaceConfig};
pub use trials::{run_exponential_trials, run_laplace_trials, ExponentialTrials, LaplaceTrials, TrialConfig};
pub use utilities::params::{Epsilon, PrivacyLevel, Sensitivity};
pub use utilities::randomness::{GeneratorOpenSSL, RandomSource, SeededGenerator};
pub use utilities::sampling::{normalized_sample, ProbabilityVector};
