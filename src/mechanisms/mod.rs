/// The exponential mechanism
pub mod exponential;
/// The Laplace mechanism
pub mod laplace;
