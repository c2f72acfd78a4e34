#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::{kernels::LaneKernelSet, split::LaneSet};
use crate::{
    dsp::convolve::{Convolver, Direct},
    error::{FirError, Result},
};

/// The N independent lane convolutions, ready for recombination.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneConvOutput {
    outputs: Vec<Vec<f64>>,
    original_len: usize,
    kernel_len: usize,
}

impl LaneConvOutput {
    pub fn lanes(&self) -> &[Vec<f64>] {
        &self.outputs
    }

    /// laneLen + laneKernelLen - 1.
    pub fn conv_len(&self) -> usize {
        self.outputs.first().map_or(0, Vec::len)
    }

    /// Length of the signal that was split.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    pub fn kernel_len(&self) -> usize {
        self.kernel_len
    }

    /// originalLen + N * laneKernelLen - 1.
    pub fn reconstructed_len(&self) -> usize {
        self.original_len + self.outputs.len() * self.kernel_len - 1
    }
}

/// Convolves every lane against its lane kernel with a shared backend.
///
/// Lanes run one after another. With the opt-in `parallel` feature they run
/// as rayon tasks instead, joined before returning. Either way the outputs
/// come back in lane order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaneConvolver<B = Direct> {
    backend: B,
}

impl<B: Convolver> LaneConvolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn convolve(&self, lanes: &LaneSet, kernels: &LaneKernelSet) -> Result<LaneConvOutput> {
        if lanes.count() != kernels.lanes() {
            return Err(FirError::LaneKernelMismatch {
                expected: lanes.count(),
                actual: kernels.lanes(),
            });
        }

        let convolve_lane = |p: usize| self.backend.convolve(lanes.lane(p), kernels.kernel_for(p));

        #[cfg(feature = "parallel")]
        let outputs = (0..lanes.count())
            .into_par_iter()
            .map(convolve_lane)
            .collect::<Result<Vec<_>>>()?;

        #[cfg(not(feature = "parallel"))]
        let outputs = (0..lanes.count())
            .map(convolve_lane)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            lanes = lanes.count(),
            lane_len = lanes.lane_len(),
            kernel_len = kernels.kernel_len(),
            "lane convolutions joined"
        );

        Ok(LaneConvOutput {
            outputs,
            original_len: lanes.original_len(),
            kernel_len: kernels.kernel_len(),
        })
    }
}
