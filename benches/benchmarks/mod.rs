pub mod exponential_benchmark;
pub mod laplace_benchmark;
pub mod outcomespace_size_benchmark;
