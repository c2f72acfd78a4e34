use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::convolve::Convolver,
    error::{FirError, Result},
    kernel::{ensure_lanes, FilterDesign, FilterKernel},
};

/*
Lane Kernels and the Equivalent Kernel
======================================

Each lane is convolved with a short kernel g at 1/N of the full rate. After
the carry recombiner stitches the lanes back together, output sample N*m + p
sums lanes 0..=p at lane step m and lanes p+1..N at step m - 1. Written out
against the input, that is a full-rate convolution with every g[j] held for N
taps:

    g        = [ a       b       c ]
    h_eq     = [ a a a a b b b b c c c c ]      (N = 4)

So the lane pipeline reproduces `Direct(signal, h_eq)` exactly. h_eq equals
the full-rate kernel when that kernel is already hold-shaped (a box whose
length is a multiple of N, or anything at N = 1); otherwise the two differ
and the difference is a property of the lane kernel, not a fault.

Per-lane sets give each lane its own g_p; then the equivalent output is the
sum over p of the signal masked to lane p convolved with h_eq(g_p).
*/

/// How lane kernels are derived from a full-rate design.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneKernelStrategy {
    /// Keep every Nth coefficient of the full kernel, starting at 0.
    #[default]
    Decimate,
    /// Synthesize the design again at 1/N of the sample rate, scaled by 1/N.
    Resynthesize,
}

#[derive(Debug, Clone, PartialEq)]
enum Kernels {
    Shared(Vec<f64>),
    PerLane(Vec<Vec<f64>>),
}

/// The kernel(s) the N lanes convolve against.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneKernelSet {
    lanes: usize,
    kernels: Kernels,
    strategy: Option<LaneKernelStrategy>,
}

/// `kernel` with each coefficient repeated `lanes` times.
pub fn hold(kernel: &[f64], lanes: usize) -> Vec<f64> {
    kernel
        .iter()
        .flat_map(|&g| std::iter::repeat(g).take(lanes))
        .collect()
}

impl LaneKernelSet {
    /// One kernel shared by all `lanes` lanes.
    pub fn shared(kernel: Vec<f64>, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        if kernel.is_empty() {
            return Err(FirError::empty("lane kernel"));
        }
        Ok(Self {
            lanes,
            kernels: Kernels::Shared(kernel),
            strategy: None,
        })
    }

    /// One kernel per lane; all must have the same length.
    pub fn per_lane(kernels: Vec<Vec<f64>>) -> Result<Self> {
        let expected = match kernels.first() {
            None => return Err(FirError::ZeroLanes),
            Some(k) if k.is_empty() => return Err(FirError::empty("lane kernel")),
            Some(k) => k.len(),
        };
        if let Some(k) = kernels.iter().find(|k| k.len() != expected) {
            return Err(FirError::LaneKernelMismatch {
                expected,
                actual: k.len(),
            });
        }
        Ok(Self {
            lanes: kernels.len(),
            kernels: Kernels::PerLane(kernels),
            strategy: None,
        })
    }

    /// Every `lanes`-th coefficient of `kernel`, shared by all lanes.
    pub fn decimate(kernel: &FilterKernel, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        let decimated: Vec<f64> = kernel.coefficients().iter().step_by(lanes).copied().collect();
        debug!(
            full_taps = kernel.len(),
            lane_taps = decimated.len(),
            lanes,
            "decimated lane kernel"
        );
        let mut set = Self::shared(decimated, lanes)?;
        set.strategy = Some(LaneKernelStrategy::Decimate);
        Ok(set)
    }

    /// `design` synthesized at the decimated rate and scaled by 1/`lanes`.
    pub fn resynthesize(design: &FilterDesign, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        let lane_kernel = design
            .decimated(lanes)?
            .synthesize()?
            .scaled(1.0 / lanes as f64);
        debug!(
            lane_taps = lane_kernel.len(),
            lane_rate = lane_kernel.diagnostics().sample_rate,
            lanes,
            "re-synthesized lane kernel"
        );
        let mut set = Self::shared(lane_kernel.coefficients().to_vec(), lanes)?;
        set.strategy = Some(LaneKernelStrategy::Resynthesize);
        Ok(set)
    }

    /// Build with `strategy` from a design and its full-rate kernel.
    pub fn build(
        strategy: LaneKernelStrategy,
        design: &FilterDesign,
        full: &FilterKernel,
        lanes: usize,
    ) -> Result<Self> {
        match strategy {
            LaneKernelStrategy::Decimate => Self::decimate(full, lanes),
            LaneKernelStrategy::Resynthesize => Self::resynthesize(design, lanes),
        }
    }

    /// Number of lanes N.
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Length of each lane kernel.
    pub fn kernel_len(&self) -> usize {
        match &self.kernels {
            Kernels::Shared(k) => k.len(),
            Kernels::PerLane(ks) => ks.first().map_or(0, Vec::len),
        }
    }

    /// `None` for sets built by hand.
    pub fn strategy(&self) -> Option<LaneKernelStrategy> {
        self.strategy
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.kernels, Kernels::Shared(_))
    }

    pub fn kernel_for(&self, lane: usize) -> &[f64] {
        match &self.kernels {
            Kernels::Shared(k) => k,
            Kernels::PerLane(ks) => &ks[lane],
        }
    }

    /// The full-rate kernel lane `lane` realizes after recombination.
    pub fn equivalent_kernel(&self, lane: usize) -> Vec<f64> {
        hold(self.kernel_for(lane), self.lanes)
    }

    /// What the recombined lane outputs must equal, computed at full rate
    /// with `backend`.
    ///
    /// Length is `signal.len() + N * kernel_len - 1`.
    pub fn reference_output<C: Convolver>(&self, signal: &[f64], backend: &C) -> Result<Vec<f64>> {
        match &self.kernels {
            Kernels::Shared(k) => backend.convolve(signal, &hold(k, self.lanes)),
            Kernels::PerLane(_) => {
                let out_len = signal.len() + self.lanes * self.kernel_len() - 1;
                let mut out = vec![0.0; out_len];
                for lane in 0..self.lanes {
                    let masked: Vec<f64> = signal
                        .iter()
                        .enumerate()
                        .map(|(i, &x)| if i % self.lanes == lane { x } else { 0.0 })
                        .collect();
                    let part = backend.convolve(&masked, &self.equivalent_kernel(lane))?;
                    for (o, v) in out.iter_mut().zip(part) {
                        *o += v;
                    }
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::convolve::Direct,
        kernel::{MovingAverage, SincDesign},
    };

    #[test]
    fn hold_repeats_each_coefficient() {
        assert_eq!(hold(&[1.0, 2.0], 3), vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert_eq!(hold(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    }

    #[test]
    fn decimate_keeps_every_nth_from_zero() {
        let design = SincDesign::new(1_000.0, 3.0, 61);
        let full = design.lowpass().unwrap();
        let set = LaneKernelSet::decimate(&full, 4).unwrap();
        assert_eq!(set.kernel_len(), 16);
        assert_eq!(set.kernel_for(2)[1], full.coefficients()[4]);
        assert_eq!(set.strategy(), Some(LaneKernelStrategy::Decimate));
        assert!(set.is_shared());
    }

    #[test]
    fn box_kernel_is_its_own_equivalent() {
        let full = MovingAverage::with_length(32, 3_200.0).synthesize().unwrap();
        let set = LaneKernelSet::decimate(&full, 4).unwrap();
        assert_eq!(set.equivalent_kernel(0), full.coefficients());
    }

    #[test]
    fn resynthesis_keeps_full_gain() {
        let design = FilterDesign::from(MovingAverage::with_length(32, 3_200.0));
        let set = LaneKernelSet::resynthesize(&design, 4).unwrap();
        assert_eq!(set.kernel_len(), 8);
        let gain: f64 = set.equivalent_kernel(0).iter().sum();
        assert!((gain - 1.0).abs() < 1e-12);
        assert_eq!(set.strategy(), Some(LaneKernelStrategy::Resynthesize));
    }

    #[test]
    fn per_lane_kernels_must_agree_in_length() {
        assert!(matches!(
            LaneKernelSet::per_lane(vec![vec![1.0, 2.0], vec![1.0]]),
            Err(FirError::LaneKernelMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            LaneKernelSet::per_lane(vec![]),
            Err(FirError::ZeroLanes)
        ));
        assert!(LaneKernelSet::shared(vec![], 2).is_err());
    }

    #[test]
    fn per_lane_reference_masks_the_signal() {
        let set = LaneKernelSet::per_lane(vec![vec![1.0], vec![10.0]]).unwrap();
        let out = set.reference_output(&[1.0, 1.0, 1.0], &Direct).unwrap();
        // lane 0 samples at 0 and 2 with [1, 1]; lane 1 at 1 with [10, 10]
        assert_eq!(out, vec![1.0, 11.0, 11.0, 1.0]);
    }
}
