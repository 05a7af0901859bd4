/// Validated privacy parameters and the privacy level classifier.
pub mod params;
/// Random sources for the mechanisms.
pub mod randomness;
/// Probability vectors and weighted categorical sampling.
pub mod sampling;
