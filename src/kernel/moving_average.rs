use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ensure_lanes, FilterKernel, FilterKind, KernelDiagnostics, Normalization};
use crate::{
    dsp::window::linspace,
    error::{ensure_nyquist, ensure_positive, ensure_tap_count, FirError, Result},
};

/*
Moving Average
==============

A box of L equal taps, each 1/L. Its frequency response is a sampled sinc
with the first null at sample_rate / L.

When built from a cutoff, the length puts the cutoff halfway between the
response peak and that first null:

    L = ceil(sample_rate / (2 * cutoff)), bumped to the next odd value

so the box has a center tap. A directly given length is used as is.
*/

/// Box-car averaging kernel, sized directly or from a cutoff frequency.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovingAverage {
    Length { taps: usize, sample_rate: f64 },
    Cutoff { cutoff_hz: f64, sample_rate: f64 },
}

impl MovingAverage {
    pub fn with_length(taps: usize, sample_rate: f64) -> Self {
        MovingAverage::Length { taps, sample_rate }
    }

    pub fn with_cutoff(cutoff_hz: f64, sample_rate: f64) -> Self {
        MovingAverage::Cutoff {
            cutoff_hz,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        match *self {
            MovingAverage::Length { sample_rate, .. } | MovingAverage::Cutoff { sample_rate, .. } => {
                sample_rate
            }
        }
    }

    /// Validated tap count.
    pub fn taps(&self) -> Result<usize> {
        match *self {
            MovingAverage::Length { taps, sample_rate } => {
                ensure_positive("sample_rate", sample_rate)?;
                if taps == 0 {
                    return Err(FirError::TooFewTaps { taps, required: 1 });
                }
                ensure_tap_count("moving average", taps as f64)
            }
            MovingAverage::Cutoff {
                cutoff_hz,
                sample_rate,
            } => {
                ensure_positive("cutoff_hz", cutoff_hz)?;
                ensure_positive("sample_rate", sample_rate)?;
                ensure_nyquist("moving average", sample_rate / cutoff_hz)?;
                let taps = (sample_rate / (2.0 * cutoff_hz)).ceil();
                let taps = if taps % 2.0 == 0.0 { taps + 1.0 } else { taps };
                ensure_tap_count("moving average", taps)
            }
        }
    }

    pub fn synthesize(&self) -> Result<FilterKernel> {
        let taps = self.taps()?;
        let sample_rate = self.sample_rate();

        let coefficients = vec![1.0 / taps as f64; taps];
        let time = linspace(0.0, taps as f64 / sample_rate, taps);

        debug!(taps, sample_rate, "moving average kernel");

        Ok(FilterKernel::new(
            coefficients,
            time,
            Normalization::UnitSum,
            KernelDiagnostics::new(FilterKind::MovingAverage, taps, sample_rate),
        ))
    }

    /// Same averaging window on a stream decimated by `lanes`.
    pub fn decimated(&self, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        Ok(match *self {
            MovingAverage::Length { taps, sample_rate } => MovingAverage::Length {
                taps: taps.div_ceil(lanes),
                sample_rate: sample_rate / lanes as f64,
            },
            MovingAverage::Cutoff {
                cutoff_hz,
                sample_rate,
            } => MovingAverage::Cutoff {
                cutoff_hz,
                sample_rate: sample_rate / lanes as f64,
            },
        })
    }
}
