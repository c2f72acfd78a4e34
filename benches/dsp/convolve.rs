//! Benchmarks for the three convolution backends.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyfir::{
    dsp::{Convolver, Direct, Fft, FixedPoint},
    kernel::FixedLengthBandPass,
};

use crate::{test_signal, SIGNAL_LENS};

pub fn bench_convolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolve");
    let kernel = FixedLengthBandPass::new(80e6, 50e6, 249, 2_457.6e6)
        .synthesize()
        .expect("band-pass kernel");
    let taps = kernel.coefficients();

    for &len in SIGNAL_LENS {
        let signal = test_signal(len);

        group.bench_with_input(BenchmarkId::new("direct", len), &len, |b, _| {
            b.iter(|| Direct.convolve(black_box(&signal), black_box(taps)))
        });

        group.bench_with_input(BenchmarkId::new("fft", len), &len, |b, _| {
            b.iter(|| Fft.convolve(black_box(&signal), black_box(taps)))
        });

        let fixed = FixedPoint::default();
        group.bench_with_input(BenchmarkId::new("fixed_point", len), &len, |b, _| {
            b.iter(|| fixed.convolve(black_box(&signal), black_box(taps)))
        });
    }

    group.finish();
}
