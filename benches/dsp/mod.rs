//! Benchmarks for convolution backends and kernel synthesis.

mod convolve;
mod synthesis;

pub use convolve::bench_convolve;
pub use synthesis::bench_synthesis;
