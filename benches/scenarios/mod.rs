//! End-to-end scenario benchmarks.
//!
//! These run the same lane pipeline the CLI scenarios run, across lane counts.

mod pipeline;

pub use pipeline::bench_pipeline;
