//! Repeated-trial summaries.
//!
//! Runs a mechanism many times with fixed inputs and collects what a report
//! needs: theoretical probabilities next to empirical frequencies for the
//! exponential mechanism, and error statistics for the Laplace mechanism.
//! Nothing here prints or plots.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::{MechanismError, Result};
use crate::mechanisms::exponential::{exponential_mechanism, exponential_probabilities, Candidate};
use crate::mechanisms::laplace::LaplaceConfig;
use crate::utilities::params::{Epsilon, PrivacyLevel, Sensitivity};
use crate::utilities::randomness::RandomSource;
use crate::utilities::sampling::ProbabilityVector;

fn default_num_trials() -> usize {
    1000
}

fn default_epsilons() -> Vec<f64> {
    vec![0.1, 1.0, 2.0]
}

/// How many trials to run, and at which privacy levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default = "default_num_trials")]
    pub num_trials: usize,
    #[serde(default = "default_epsilons")]
    pub epsilons: Vec<f64>,
}

impl Default for TrialConfig {
    fn default() -> Self {
        TrialConfig {
            num_trials: default_num_trials(),
            epsilons: default_epsilons(),
        }
    }
}

impl TrialConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    /// ## Example
    /// ```
    /// use dpmech::TrialConfig;
    /// let config = TrialConfig::from_json(r#"{"epsilons": [0.5]}"#).unwrap();
    /// assert_eq!(config.num_trials, 1000);
    /// ```
    pub fn from_json(json: &str) -> Result<TrialConfig> {
        let config: TrialConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the trial count and every epsilon.
    pub fn validate(&self) -> Result<Vec<Epsilon>> {
        if self.num_trials == 0 {
            return Err(MechanismError::InvalidTrialCount(self.num_trials));
        }
        self.epsilons.iter().map(|e| Epsilon::new(*e)).collect()
    }

    /// Run the exponential mechanism trials at every configured epsilon.
    pub fn sweep_exponential<L, R>(&self, candidates: &[Candidate<L>], rng: &mut R) -> Result<Vec<ExponentialTrials>>
    where
        L: Eq + Hash,
        R: RandomSource + ?Sized,
    {
        self.validate()?
            .into_iter()
            .map(|epsilon| run_exponential_trials(candidates, epsilon, self.num_trials, rng))
            .collect()
    }

    /// Run the Laplace mechanism trials at every configured epsilon.
    pub fn sweep_laplace<R: RandomSource + ?Sized>(&self, true_value: f64, sensitivity: Sensitivity, rng: &mut R) -> Result<Vec<LaplaceTrials>> {
        self.validate()?
            .into_iter()
            .map(|epsilon| run_laplace_trials(true_value, sensitivity, epsilon, self.num_trials, rng))
            .collect()
    }
}

/// Outcome counts of repeated exponential mechanism runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExponentialTrials {
    pub epsilon: Epsilon,
    pub level: PrivacyLevel,
    /// Theoretical selection probabilities
    pub probabilities: ProbabilityVector,
    /// How often each candidate was selected
    pub counts: Vec<usize>,
    pub trials: usize,
}

impl ExponentialTrials {
    pub fn empirical_frequencies(&self) -> Vec<f64> {
        self.counts
            .iter()
            .map(|c| *c as f64 / self.trials as f64)
            .collect()
    }
}

/// Run the exponential mechanism `num_trials` times on the same candidates.
/// ## Errors
/// Returns `InvalidTrialCount` for zero trials, and any error of
/// [exponential_mechanism](../mechanisms/exponential/fn.exponential_mechanism.html).
pub fn run_exponential_trials<L, R>(candidates: &[Candidate<L>], epsilon: Epsilon, num_trials: usize, rng: &mut R) -> Result<ExponentialTrials>
where
    L: Eq + Hash,
    R: RandomSource + ?Sized,
{
    if num_trials == 0 {
        return Err(MechanismError::InvalidTrialCount(num_trials));
    }
    let probabilities = exponential_probabilities(candidates, epsilon)?;
    let mut counts = vec![0; candidates.len()];
    for _ in 0..num_trials {
        counts[exponential_mechanism(candidates, epsilon, rng)?.index] += 1;
    }
    tracing::debug!(epsilon = epsilon.value(), num_trials, "exponential trials complete");

    Ok(ExponentialTrials {
        epsilon,
        level: epsilon.privacy_level(),
        probabilities,
        counts,
        trials: num_trials,
    })
}

/// Noisy answers from repeated Laplace mechanism runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaplaceTrials {
    pub true_value: f64,
    pub config: LaplaceConfig,
    pub level: PrivacyLevel,
    pub noisy_values: Vec<f64>,
}

impl LaplaceTrials {
    pub fn scale(&self) -> f64 {
        self.config.scale()
    }

    pub fn empirical_mean(&self) -> f64 {
        mean(&self.noisy_values)
    }

    /// Population variance of the noisy values.
    pub fn empirical_variance(&self) -> f64 {
        variance(&self.noisy_values)
    }

    /// `|noisy - true|` for every trial.
    pub fn absolute_errors(&self) -> Vec<f64> {
        self.noisy_values
            .iter()
            .map(|v| (v - self.true_value).abs())
            .collect()
    }

    pub fn mean_error(&self) -> f64 {
        mean(&self.absolute_errors())
    }

    /// Population standard deviation of the absolute errors.
    pub fn std_error(&self) -> f64 {
        variance(&self.absolute_errors()).sqrt()
    }
}

/// Run the Laplace mechanism `num_trials` times on the same true value.
/// ## Errors
/// Returns `InvalidTrialCount` for zero trials, and any error of
/// [laplace_mechanism](../mechanisms/laplace/fn.laplace_mechanism.html).
pub fn run_laplace_trials<R: RandomSource + ?Sized>(true_value: f64, sensitivity: Sensitivity, epsilon: Epsilon,
                                                    num_trials: usize, rng: &mut R) -> Result<LaplaceTrials> {
    if num_trials == 0 {
        return Err(MechanismError::InvalidTrialCount(num_trials));
    }
    let config = LaplaceConfig::new(epsilon, sensitivity)?;
    let noisy_values = (0..num_trials)
        .map(|_| config.apply(true_value, rng))
        .collect::<Result<Vec<f64>>>()?;
    tracing::debug!(epsilon = epsilon.value(), num_trials, "laplace trials complete");

    Ok(LaplaceTrials {
        true_value,
        config,
        level: epsilon.privacy_level(),
        noisy_values,
    })
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn variance(xs: &[f64]) -> f64 {
    let m = mean(xs);
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}
