//! Benchmarks for kernel synthesis.
//!
//! Band-pass synthesis is dominated by the cascade convolution, so its cost
//! grows with the square of the half length.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyfir::kernel::{CarrierAlignedBandPass, FixedLengthBandPass, SincDesign};

pub fn bench_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/synthesis");

    for &taps in &[61usize, 249, 1_001] {
        let lowpass = SincDesign::new(1_000.0, 3.0, taps);
        group.bench_with_input(BenchmarkId::new("lowpass", taps), &taps, |b, _| {
            b.iter(|| black_box(&lowpass).lowpass())
        });

        let bandpass = FixedLengthBandPass::new(80e6, 50e6, taps, 2_457.6e6);
        group.bench_with_input(BenchmarkId::new("fixed_length_bandpass", taps), &taps, |b, _| {
            b.iter(|| black_box(&bandpass).synthesize())
        });
    }

    let carrier = CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 30.0);
    group.bench_function("carrier_aligned_bandpass", |b| {
        b.iter(|| black_box(&carrier).synthesize())
    });

    group.finish();
}
