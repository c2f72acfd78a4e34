//! Benchmarks for split, lane convolution, and recombination.
//!
//! `reconstruct` isolates the lane path; `run` adds synthesis and both
//! full-rate references.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use polyfir::{
    kernel::{FixedLengthBandPass, MovingAverage},
    lanes::LaneKernelSet,
    FilterDesign, LaneKernelStrategy, LanePipeline, Signal,
};

use crate::{test_signal, SIGNAL_LENS};

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pipeline");
    let rate = 2_457.6e6;
    let bandpass = FixedLengthBandPass::new(80e6, 50e6, 249, rate);
    let full = bandpass.synthesize().expect("band-pass kernel");
    let design = FilterDesign::from(bandpass);

    for &lanes in &[1usize, 4, 8] {
        let kernels = LaneKernelSet::decimate(&full, lanes).expect("lane kernels");
        let pipeline = LanePipeline::new(lanes);

        for &len in SIGNAL_LENS {
            let signal = Signal::new(test_signal(len), rate).expect("test signal");
            let id = format!("lanes={lanes}/len={len}");

            group.bench_with_input(BenchmarkId::new("reconstruct", &id), &len, |b, _| {
                b.iter(|| pipeline.reconstruct(black_box(&signal), black_box(&kernels)))
            });
        }
    }

    // moving average over one period, the smallest realistic run
    let signal = Signal::sine(100.0, 3_200.0, 32).expect("sine");
    let moving_average = FilterDesign::from(MovingAverage::with_length(32, 3_200.0));
    for strategy in [LaneKernelStrategy::Decimate, LaneKernelStrategy::Resynthesize] {
        let pipeline = LanePipeline::new(4).strategy(strategy);
        group.bench_function(format!("run/moving_average/{strategy:?}"), |b| {
            b.iter(|| pipeline.run(black_box(&signal), black_box(&moving_average)))
        });
    }

    let signal = Signal::new(test_signal(1_024), rate).expect("test signal");
    let pipeline = LanePipeline::new(4).strategy(LaneKernelStrategy::Resynthesize);
    group.bench_function("run/bandpass/resynthesize", |b| {
        b.iter(|| pipeline.run(black_box(&signal), black_box(&design)))
    });

    group.finish();
}
