//! End-to-end lane pipeline: synthesize, split, convolve, recombine, compare.
//!
//! ```
//! use polyfir::{kernel::MovingAverage, LanePipeline, Signal};
//!
//! let signal = Signal::sine(100.0, 3_200.0, 32)?;
//! let design = MovingAverage::with_length(32, 3_200.0).into();
//!
//! let report = LanePipeline::new(4).run(&signal, &design)?;
//! assert_eq!(report.reconstructed.len(), 63);
//! report.verify()?;
//! # Ok::<(), polyfir::FirError>(())
//! ```

use tracing::info;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        convolve::{Convolver, Direct, Fft},
        fixed_point::FixedPoint,
    },
    error::{ensure_positive, FirError, Result},
    kernel::{ensure_lanes, FilterDesign, FilterKernel},
    lanes::{recombine, LaneConvolver, LaneKernelSet, LaneKernelStrategy, LaneSet},
    signal::Signal,
};

/// Relative tolerance used by [`PipelineReport::verify`] unless overridden.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Builder for one lane-pipeline configuration.
#[derive(Debug, Clone, Copy)]
pub struct LanePipeline<B = Direct> {
    lanes: usize,
    strategy: LaneKernelStrategy,
    backend: B,
    tolerance: f64,
}

impl LanePipeline<Direct> {
    /// `lanes` lanes, decimated lane kernels, `f64` convolution.
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes,
            strategy: LaneKernelStrategy::default(),
            backend: Direct,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl<B: Convolver> LanePipeline<B> {
    pub fn strategy(mut self, strategy: LaneKernelStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Convolution backend for the lanes and both references.
    pub fn backend<C: Convolver>(self, backend: C) -> LanePipeline<C> {
        LanePipeline {
            lanes: self.lanes,
            strategy: self.strategy,
            backend,
            tolerance: self.tolerance,
        }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Split `signal`, convolve each lane with `kernels`, recombine.
    pub fn reconstruct(&self, signal: &Signal, kernels: &LaneKernelSet) -> Result<Vec<f64>> {
        let lanes = LaneSet::split(signal, self.lanes)?;
        let outputs = LaneConvolver::new(&self.backend).convolve(&lanes, kernels)?;
        recombine(&outputs)
    }

    pub fn run(&self, signal: &Signal, design: &FilterDesign) -> Result<PipelineReport> {
        let lanes = ensure_lanes(self.lanes)?;
        ensure_positive("tolerance", self.tolerance)?;

        let kernel = design.synthesize()?;
        let lane_kernels = LaneKernelSet::build(self.strategy, design, &kernel, lanes)?;

        let reconstructed = self.reconstruct(signal, &lane_kernels)?;
        let reference = lane_kernels.reference_output(signal.samples(), &self.backend)?;
        let full_direct = self
            .backend
            .convolve(signal.samples(), kernel.coefficients())?;

        let max_error = max_abs_diff(&reconstructed, &reference);
        let divergence = max_abs_diff(&reconstructed, &full_direct);

        info!(
            lanes,
            strategy = ?self.strategy,
            kind = ?kernel.kind(),
            taps = kernel.len(),
            lane_taps = lane_kernels.kernel_len(),
            signal_len = signal.len(),
            output_len = reconstructed.len(),
            max_error,
            divergence,
            "lane pipeline run"
        );

        Ok(PipelineReport {
            lanes,
            strategy: self.strategy,
            kernel,
            lane_kernels,
            reconstructed,
            reference,
            full_direct,
            max_error,
            divergence,
            tolerance: self.tolerance,
        })
    }
}

/// Outputs and error metrics of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub lanes: usize,
    pub strategy: LaneKernelStrategy,
    /// The full-rate kernel the design synthesized.
    pub kernel: FilterKernel,
    pub lane_kernels: LaneKernelSet,
    /// Recombined lane outputs.
    pub reconstructed: Vec<f64>,
    /// Full-rate convolution with the equivalent kernel of `lane_kernels`.
    pub reference: Vec<f64>,
    /// Full-rate convolution with `kernel`.
    pub full_direct: Vec<f64>,
    /// Largest |reconstructed - reference|.
    pub max_error: f64,
    /// Largest |reconstructed - full_direct|, the shorter one zero-extended.
    pub divergence: f64,
    pub tolerance: f64,
}

impl PipelineReport {
    /// Fails on the first sample farther than `tolerance * max(|reference|, peak)`
    /// from the reference, where `peak` is the largest |reference| sample.
    ///
    /// An all-zero reference only accepts exact zeros.
    pub fn verify(&self) -> Result<()> {
        let peak = self.reference.iter().fold(0.0, |peak: f64, v| peak.max(v.abs()));
        let len = self.reconstructed.len().max(self.reference.len());
        for index in 0..len {
            let expected = self.reference.get(index).copied().unwrap_or(0.0);
            let actual = self.reconstructed.get(index).copied().unwrap_or(0.0);
            let same_len = index < self.reconstructed.len() && index < self.reference.len();
            let bound = self.tolerance * expected.abs().max(peak);
            if !same_len || !((actual - expected).abs() <= bound) {
                return Err(FirError::ReconstructionMismatch {
                    index,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Largest elementwise |a - b|, treating the shorter sequence as zero-extended.
pub fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0.0);
            let y = b.get(i).copied().unwrap_or(0.0);
            (x - y).abs()
        })
        .fold(0.0, f64::max)
}

/// Convolution backend selected by name in a serialized configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Direct,
    Fft,
    FixedPoint { sample_bits: u32 },
}

/// Sine test input.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineConfig {
    pub frequency_hz: f64,
    pub sample_rate: f64,
    pub samples: usize,
}

impl SineConfig {
    pub fn signal(&self) -> Result<Signal> {
        Signal::sine(self.frequency_hz, self.sample_rate, self.samples)
    }
}

/// A complete pipeline run as plain data.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub lanes: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub strategy: LaneKernelStrategy,
    #[cfg_attr(feature = "serde", serde(default))]
    pub backend: Backend,
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,
    pub signal: SineConfig,
    pub design: FilterDesign,
}

#[cfg(feature = "serde")]
fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl PipelineConfig {
    pub fn run(&self) -> Result<PipelineReport> {
        let signal = self.signal.signal()?;
        let pipeline = LanePipeline::new(self.lanes)
            .strategy(self.strategy)
            .tolerance(self.tolerance);

        match self.backend {
            Backend::Direct => pipeline.run(&signal, &self.design),
            Backend::Fft => pipeline.backend(Fft).run(&signal, &self.design),
            Backend::FixedPoint { sample_bits } => pipeline
                .backend(FixedPoint::new(sample_bits)?)
                .run(&signal, &self.design),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{MovingAverage, SincDesign};

    fn sine_32() -> Signal {
        Signal::sine(100.0, 3_200.0, 32).unwrap()
    }

    #[test]
    fn moving_average_scenario_reconstructs() {
        let design = MovingAverage::with_length(32, 3_200.0).into();
        let report = LanePipeline::new(4).run(&sine_32(), &design).unwrap();

        assert_eq!(report.reconstructed.len(), 63);
        assert_eq!(report.full_direct.len(), 63);
        report.verify().unwrap();
        assert!(report.divergence < 1e-9);
    }

    #[test]
    fn both_strategies_report_finite_divergence() {
        let design = FilterDesign::LowPass(SincDesign::new(400.0, 2.0, 33));
        let signal = Signal::sine(100.0, 3_200.0, 64).unwrap();
        for strategy in [LaneKernelStrategy::Decimate, LaneKernelStrategy::Resynthesize] {
            let report = LanePipeline::new(2)
                .strategy(strategy)
                .run(&signal, &design)
                .unwrap();
            report.verify().unwrap();
            assert!(report.divergence.is_finite());
            assert_eq!(report.strategy, strategy);
        }
    }

    #[test]
    fn verify_names_first_bad_index() {
        let design = MovingAverage::with_length(8, 800.0).into();
        let signal = Signal::new(vec![1.0; 8], 800.0).unwrap();
        let mut report = LanePipeline::new(2).run(&signal, &design).unwrap();
        report.reconstructed[5] += 1.0;
        assert!(matches!(
            report.verify(),
            Err(FirError::ReconstructionMismatch { index: 5, .. })
        ));
    }

    #[test]
    fn verify_scales_with_signal_amplitude() {
        let quiet: Vec<f64> = sine_32().samples().iter().map(|x| x * 1e-6).collect();
        let signal = Signal::new(quiet, 3_200.0).unwrap();
        let design = MovingAverage::with_length(32, 3_200.0).into();
        let mut report = LanePipeline::new(4).run(&signal, &design).unwrap();
        report.verify().unwrap();

        // about 1e-3 of the output scale, far above a 1e-9 relative tolerance
        report.reconstructed[10] += 5e-10;
        assert!(matches!(
            report.verify(),
            Err(FirError::ReconstructionMismatch { index: 10, .. })
        ));
    }

    #[test]
    fn verify_rejects_non_finite_samples() {
        let design = MovingAverage::with_length(8, 800.0).into();
        let signal = Signal::new(vec![1.0; 8], 800.0).unwrap();
        let mut report = LanePipeline::new(2).run(&signal, &design).unwrap();
        report.reconstructed[3] = f64::NAN;
        assert!(matches!(
            report.verify(),
            Err(FirError::ReconstructionMismatch { index: 3, .. })
        ));
    }

    #[test]
    fn rejects_zero_lanes_and_bad_tolerance() {
        let design = MovingAverage::with_length(8, 800.0).into();
        assert!(matches!(
            LanePipeline::new(0).run(&sine_32(), &design),
            Err(FirError::ZeroLanes)
        ));
        assert!(LanePipeline::new(2)
            .tolerance(0.0)
            .run(&sine_32(), &design)
            .is_err());
    }

    #[test]
    fn max_abs_diff_zero_extends() {
        assert_eq!(max_abs_diff(&[1.0, 2.0], &[1.0]), 2.0);
        assert_eq!(max_abs_diff(&[], &[]), 0.0);
    }

    #[test]
    fn config_runs_every_backend() {
        let mut config = PipelineConfig {
            lanes: 4,
            strategy: LaneKernelStrategy::Decimate,
            backend: Backend::Direct,
            tolerance: DEFAULT_TOLERANCE,
            signal: SineConfig {
                frequency_hz: 100.0,
                sample_rate: 3_200.0,
                samples: 32,
            },
            design: MovingAverage::with_length(32, 3_200.0).into(),
        };
        config.run().unwrap().verify().unwrap();

        config.backend = Backend::Fft;
        config.run().unwrap().verify().unwrap();

        config.backend = Backend::FixedPoint { sample_bits: 16 };
        let report = config.run().unwrap();
        assert_eq!(report.max_error, 0.0);
    }
}
