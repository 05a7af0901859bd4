//! Implements the exponential mechanism.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{MechanismError, Result};
use crate::utilities::params::Epsilon;
use crate::utilities::randomness::RandomSource;
use crate::utilities::sampling::ProbabilityVector;

/// An outcome the mechanism may select, with its utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<L> {
    pub label: L,
    pub utility: f64,
}

impl<L> Candidate<L> {
    pub fn new(label: L, utility: f64) -> Candidate<L> {
        Candidate { label, utility }
    }
}

impl<L> From<(L, f64)> for Candidate<L> {
    fn from((label, utility): (L, f64)) -> Candidate<L> {
        Candidate { label, utility }
    }
}

/// The result of one run of the exponential mechanism.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection<'a, L> {
    /// The selected label
    pub outcome: &'a L,
    /// Position of `outcome` in the candidate set
    pub index: usize,
    /// Selection probability of every candidate, in candidate order
    pub probabilities: ProbabilityVector,
}

/// The exponential mechanism configuration. Holds the validated privacy
/// parameter and the normalizer derived from the candidate set.
#[derive(Debug)]
struct ExponentialConfig {
    /// The privacy parameter
    epsilon: Epsilon,
    /// The maximum utility in the candidate set; every utility is divided by it
    normalizer: f64,
    /// The utility whose normalized value is largest: the maximum when
    /// `normalizer` is positive, the minimum when it is negative
    reference: f64,
}

impl ExponentialConfig {
    /// Create a new context for the exponential mechanism.
    /// ## Errors
    /// Returns an error if epsilon is invalid, the candidate set is empty,
    /// any utility is not finite, a label repeats, or the maximum utility is
    /// exactly zero.
    fn new<L: Eq + Hash>(epsilon: Epsilon, candidates: &[Candidate<L>]) -> Result<ExponentialConfig> {
        epsilon.check()?;
        if candidates.is_empty() {
            return Err(MechanismError::EmptyCandidateSet);
        }

        let mut seen = HashSet::with_capacity(candidates.len());
        for (index, c) in candidates.iter().enumerate() {
            if !c.utility.is_finite() {
                return Err(MechanismError::NonFiniteInput { what: "utility", value: c.utility });
            }
            if !seen.insert(&c.label) {
                return Err(MechanismError::DuplicateLabel { index });
            }
        }

        let normalizer = candidates
            .iter()
            .map(|c| c.utility)
            .fold(f64::NEG_INFINITY, f64::max);
        if normalizer == 0.0 {
            return Err(MechanismError::DegenerateUtilityNormalization);
        }
        if normalizer < 0.0 {
            tracing::warn!(
                max_utility = normalizer,
                "all utilities are negative; normalizing by the maximum inverts their ordering"
            );
        }

        let reference = if normalizer > 0.0 {
            normalizer
        } else {
            candidates.iter().map(|c| c.utility).fold(f64::INFINITY, f64::min)
        };

        Ok(ExponentialConfig { epsilon, normalizer, reference })
    }

    /// Selection probabilities: `exp(ε·uᵢ/(2·max))`, normalized.
    ///
    /// Each exponent is taken relative to the largest one, as
    /// `ε · ((uᵢ - reference) / max) / 2`. The probabilities are unchanged, the
    /// reference candidate gets weight 1 and every exponent is `≤ 0` (or
    /// `-∞`), so no weight overflows or becomes NaN for any finite utilities
    /// and finite epsilon.
    fn probabilities<L>(&self, candidates: &[Candidate<L>]) -> Result<ProbabilityVector> {
        // epsilon is multiplied in before halving: `ε/2` underflows to zero
        // for the smallest subnormal ε, and `0 · -∞` is NaN.
        let epsilon = self.epsilon.value();
        let weights = candidates
            .iter()
            .map(|c| (epsilon * ((c.utility - self.reference) / self.normalizer) / 2.0).exp())
            .collect();
        ProbabilityVector::from_weights(weights)
    }
}

/// Selection probabilities of the exponential mechanism, without sampling.
///
/// Each utility is divided by the maximum utility in the set and weighted by
/// `exp(ε·u/2)`. This is **not** the textbook normalization by the utility's
/// sensitivity: the privacy guarantee therefore depends on the candidate set,
/// and when every utility is negative the ordering is inverted (the least
/// useful candidate becomes the most likely).
/// ## Errors
/// See [exponential_mechanism](fn.exponential_mechanism.html#errors).
/// ## Example
/// ```
/// use dpmech::{exponential_probabilities, Candidate, Epsilon};
/// let candidates = vec![
///     Candidate::new("Free Lunch", 120.0),
///     Candidate::new("Gym Membership", 80.0),
///     Candidate::new("Extra Paid Leave", 60.0),
/// ];
/// let p = exponential_probabilities(&candidates, Epsilon::new(1.0).unwrap()).unwrap();
/// assert!((p[0] - 0.381).abs() < 1e-3);
/// ```
pub fn exponential_probabilities<L: Eq + Hash>(candidates: &[Candidate<L>], epsilon: Epsilon) -> Result<ProbabilityVector> {
    let config = ExponentialConfig::new(epsilon, candidates)?;
    config.probabilities(candidates)
}

/// Implements the exponential mechanism with max-utility normalization.
/// Utilities are divided by the largest utility in `candidates`, so the
/// candidate with the largest (positive) utility has the highest weight.
/// All parameters are validated before any randomness is drawn; a valid call
/// takes exactly one draw from `rng`.
/// ## Arguments
///   * `candidates`: the labelled outcomes, with unique labels and finite utilities
///   * `epsilon`: the privacy parameter
///   * `rng`: the random source
/// ## Returns
/// A `Selection` referencing the chosen label in `candidates`, along with the
/// probability vector it was drawn from.
/// ## Errors
/// Returns `InvalidEpsilon`, `EmptyCandidateSet`, `NonFiniteInput`,
/// `DuplicateLabel` or `DegenerateUtilityNormalization` for bad inputs, and
/// `RandomnessUnavailable` if `rng` fails.
/// ## Example
/// ```
/// use dpmech::{exponential_mechanism, Candidate, Epsilon, SeededGenerator};
///
/// let candidates: Vec<Candidate<&str>> = vec![("a", 10.0).into(), ("b", 5.0).into()];
/// let mut rng = SeededGenerator::from_seed(1);
/// let selection = exponential_mechanism(&candidates, Epsilon::new(1.0).unwrap(), &mut rng).unwrap();
/// assert_eq!(*selection.outcome, candidates[selection.index].label);
/// ```
pub fn exponential_mechanism<'a, L, R>(candidates: &'a [Candidate<L>], epsilon: Epsilon, rng: &mut R) -> Result<Selection<'a, L>>
where
    L: Eq + Hash,
    R: RandomSource + ?Sized,
{
    let config = ExponentialConfig::new(epsilon, candidates)?;
    let probabilities = config.probabilities(candidates)?;

    let index = probabilities.sample(rng)?;
    tracing::debug!(
        epsilon = epsilon.value(),
        candidates = candidates.len(),
        index,
        "exponential mechanism selection"
    );

    Ok(Selection {
        outcome: &candidates[index].label,
        index,
        probabilities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utilities::randomness::tests::ScriptedSource;
    use crate::utilities::randomness::SeededGenerator;
    use crate::utilities::sampling::PROBABILITY_TOLERANCE;

    fn eps(e: f64) -> Epsilon {
        Epsilon::new(e).unwrap()
    }

    fn perks() -> Vec<Candidate<&'static str>> {
        vec![
            Candidate::new("Free Lunch", 120.0),
            Candidate::new("Gym Membership", 80.0),
            Candidate::new("Extra Paid Leave", 60.0),
        ]
    }

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < tol, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_scenario_moderate_epsilon() {
        let p = exponential_probabilities(&perks(), eps(1.0)).unwrap();
        assert_close(&p, &[0.381, 0.322, 0.297], 1e-3);
        assert!(p.is_normalized(PROBABILITY_TOLERANCE));
    }

    #[test]
    fn test_scenario_small_epsilon_near_uniform() {
        let p = exponential_probabilities(&perks(), eps(0.001)).unwrap();
        assert_close(&p, &[0.334, 0.333, 0.333], 1e-3);
    }

    #[test]
    fn test_converges_to_uniform() {
        let candidates: Vec<Candidate<u32>> = (1..=7).map(|i| Candidate::new(i, i as f64 * 3.0)).collect();
        let p = exponential_probabilities(&candidates, eps(1e-9)).unwrap();
        for pi in p.iter() {
            assert!((pi - 1.0 / 7.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_monotone_in_epsilon() {
        let candidates = perks();
        let mut previous = 0.0;
        for e in [0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 100.0, 1e4].iter() {
            let p = exponential_probabilities(&candidates, eps(*e)).unwrap();
            assert!(p.is_normalized(PROBABILITY_TOLERANCE));
            assert!(p[0] >= previous, "ε={} gave {} < {}", e, p[0], previous);
            previous = p[0];
        }
    }

    #[test]
    fn test_large_epsilon_concentrates_without_overflow() {
        let p = exponential_probabilities(&perks(), eps(1e6)).unwrap();
        assert!(p.iter().all(|x| x.is_finite()));
        assert_close(&p, &[1.0, 0.0, 0.0], 1e-12);
    }

    #[test]
    fn test_ties_split_mass() {
        let candidates = vec![
            Candidate::new("x", 50.0),
            Candidate::new("y", 50.0),
            Candidate::new("z", 10.0),
        ];
        let p = exponential_probabilities(&candidates, eps(3.0)).unwrap();
        assert!((p[0] - p[1]).abs() < 1e-15);
        let p = exponential_probabilities(&candidates, eps(1e5)).unwrap();
        assert_close(&p, &[0.5, 0.5, 0.0], 1e-12);
    }

    #[test]
    fn test_negative_utilities_invert_ordering() {
        // max = -10, so -10 normalizes to 1 and -40 to 4.
        let candidates = vec![Candidate::new("best", -10.0), Candidate::new("worst", -40.0)];
        let p = exponential_probabilities(&candidates, eps(1.0)).unwrap();
        assert!(p[1] > p[0]);
        let expected_worst = (1.5f64).exp() / ((1.5f64).exp() + 1.0);
        assert!((p[1] - expected_worst).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_sign_utilities() {
        let candidates = vec![Candidate::new(0, -20.0), Candidate::new(1, 0.0), Candidate::new(2, 20.0)];
        let p = exponential_probabilities(&candidates, eps(2.0)).unwrap();
        assert!(p[2] > p[1] && p[1] > p[0]);
        assert!(p.is_normalized(PROBABILITY_TOLERANCE));
    }

    #[test]
    fn test_degenerate_normalization() {
        let candidates = vec![Candidate::new("a", 0.0), Candidate::new("b", 0.0), Candidate::new("c", 0.0)];
        assert_eq!(
            exponential_probabilities(&candidates, eps(1.0)),
            Err(MechanismError::DegenerateUtilityNormalization)
        );
        let candidates = vec![Candidate::new("a", 0.0), Candidate::new("b", -3.0)];
        assert_eq!(
            exponential_probabilities(&candidates, eps(1.0)),
            Err(MechanismError::DegenerateUtilityNormalization)
        );
    }

    #[test]
    fn test_input_errors_draw_no_randomness() {
        let mut rng = ScriptedSource::new(vec![0]);
        let empty: Vec<Candidate<&str>> = Vec::new();
        assert_eq!(
            exponential_mechanism(&empty, eps(1.0), &mut rng).unwrap_err(),
            MechanismError::EmptyCandidateSet
        );
        let zeros = vec![Candidate::new("a", 0.0)];
        assert_eq!(
            exponential_mechanism(&zeros, eps(1.0), &mut rng).unwrap_err(),
            MechanismError::DegenerateUtilityNormalization
        );
        let dup = vec![Candidate::new("a", 1.0), Candidate::new("a", 2.0)];
        assert_eq!(
            exponential_mechanism(&dup, eps(1.0), &mut rng).unwrap_err(),
            MechanismError::DuplicateLabel { index: 1 }
        );
        let nan = vec![Candidate::new("a", 1.0), Candidate::new("b", f64::NAN)];
        assert!(matches!(
            exponential_mechanism(&nan, eps(1.0), &mut rng),
            Err(MechanismError::NonFiniteInput { what: "utility", .. })
        ));
        assert_eq!(rng.used, 0);
    }

    #[test]
    fn test_selection_uses_one_draw() {
        let candidates = perks();
        // u = 0.5 falls past the first bucket (0.381) and inside the second.
        let mut rng = ScriptedSource::new(vec![ScriptedSource::raw_for(0.5)]);
        let selection = exponential_mechanism(&candidates, eps(1.0), &mut rng).unwrap();
        assert_eq!(*selection.outcome, "Gym Membership");
        assert_eq!(selection.index, 1);
        assert_eq!(rng.used, 1);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let candidates = perks();
        let run = |seed| {
            let mut rng = SeededGenerator::from_seed(seed);
            (0..200)
                .map(|_| {
                    let selection = exponential_mechanism(&candidates, eps(1.0), &mut rng).unwrap();
                    let bits: Vec<u64> = selection.probabilities.iter().map(|p| p.to_bits()).collect();
                    (selection.index, bits)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_extreme_negative_utilities_stay_finite() {
        // Normalized utilities of 1 and 4 scaled by a huge epsilon.
        let candidates = vec![Candidate::new("a", -10.0), Candidate::new("b", -40.0)];
        let p = exponential_probabilities(&candidates, eps(1e308)).unwrap();
        assert_eq!(&p[..], &[0.0, 1.0]);

        // Normalized utilities of 1 and 1e600.
        let candidates = vec![Candidate::new("a", -1e-300), Candidate::new("b", -1e300)];
        let mut rng = SeededGenerator::from_seed(4);
        let selection = exponential_mechanism(&candidates, eps(1.0), &mut rng).unwrap();
        assert_eq!(&selection.probabilities[..], &[0.0, 1.0]);
        assert_eq!(selection.index, 1);

        // Differences that overflow before scaling.
        let candidates = vec![Candidate::new("a", f64::MAX), Candidate::new("b", -f64::MAX)];
        let p = exponential_probabilities(&candidates, eps(f64::MIN_POSITIVE)).unwrap();
        assert!(p.is_normalized(PROBABILITY_TOLERANCE));
        assert_eq!(p[0], 1.0);
    }

    #[test]
    fn test_smallest_epsilon_stays_finite() {
        let candidates = vec![Candidate::new("a", 1e-300), Candidate::new("b", -1e300)];
        let p = exponential_probabilities(&candidates, eps(5e-324)).unwrap();
        assert!(p.iter().all(|x| x.is_finite()));
        assert!(p.is_normalized(PROBABILITY_TOLERANCE));
    }

    #[test]
    fn test_probabilities_normalized_for_random_inputs() {
        let epsilons = [
            5e-324, 1e-300, 1e-9, 1e-3, 0.1, 1.0, 2.0, 10.0, 1e3, 1e10, 1e100, 1e300, f64::MAX,
        ];
        let mut rng = SeededGenerator::from_seed(2718);
        for trial in 0..300 {
            let n = 1 + (rng.uniform().unwrap() * 8.0) as usize;
            let mut candidates = Vec::with_capacity(n);
            for i in 0..n {
                let magnitude = 10f64.powf(rng.uniform().unwrap() * 600.0 - 300.0);
                let sign = match trial % 3 {
                    0 => 1.0,
                    1 => -1.0,
                    _ => if rng.uniform().unwrap() < 0.5 { -1.0 } else { 1.0 },
                };
                candidates.push(Candidate::new(i, sign * magnitude));
            }
            for e in epsilons.iter() {
                let p = exponential_probabilities(&candidates, eps(*e)).unwrap();
                assert_eq!(p.len(), n);
                assert!(
                    p.iter().all(|x| x.is_finite()) && p.is_normalized(PROBABILITY_TOLERANCE),
                    "ε={} utilities={:?} p={:?}",
                    e,
                    candidates,
                    p
                );
                let selection = exponential_mechanism(&candidates, eps(*e), &mut rng).unwrap();
                assert!(selection.index < n);
                assert!(selection.probabilities[selection.index] > 0.0);
            }
        }
    }

    #[test]
    fn test_exponential_mechanism_basic() {
        let candidates = perks();
        let mut rng = SeededGenerator::from_seed(5);
        let num_samples = 20_000;
        let mut samples = [0usize; 3];
        for _i in 0..num_samples {
            let selection = exponential_mechanism(&candidates, eps(2.0), &mut rng).unwrap();
            samples[selection.index] += 1;
        }
        println!("{:?}", samples);
        let p = exponential_probabilities(&candidates, eps(2.0)).unwrap();
        for (count, expected) in samples.iter().zip(p.iter()) {
            assert!((*count as f64 / num_samples as f64 - expected).abs() < 0.015);
        }
    }
}
