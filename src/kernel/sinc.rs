use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ensure_lanes, FilterKernel, FilterKind, KernelDiagnostics, Normalization};
use crate::{
    dsp::window::{sinc, symmetric_axis, Window},
    error::{ensure_nyquist, ensure_positive, ensure_tap_count, FirError, Result},
};

/*
Windowed-Sinc Low-Pass and High-Pass
====================================

Parameters
----------

  cutoff    f_c, the -6 dB point of the low-pass (the cut-on of the high-pass).
  periods   N, how many sinc periods (1/f_c each) the kernel spans on each side
            of t = 0.
  taps      M_k = 2M + 1 samples across the whole span. Odd so there is a
            center tap at t = 0. Designs built directly also require M even.

Layout
------

    t:   -N/f_c  . . .  -1/f_c . . .  0  . . .  1/f_c  . . .  N/f_c
         |<----------- M ---------->| |<------------ M ----------->|

The right half is M + 1 evenly spaced points from 0 to N/f_c; the left half is
its mirror without repeating t = 0. The kernel then samples the sinc at

    sample_rate = f_c * M_k / (2N)

which has to be at least 2 * f_c, i.e. M_k / (2N) >= 2.

Low-pass:   h[i] = sinc(2 f_c t_i) * w(t_i), then h /= sum(h)
High-pass:  h = -lowpass(f_c), then h[M] += 1  (spectral inversion)

Spectral inversion subtracts the low-pass from a unit impulse, so the
high-pass coefficients sum to exactly 1 - 1 = 0 and are not renormalized.
*/

/// A windowed-sinc design shared by the low-pass and high-pass builders.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SincDesign {
    pub cutoff_hz: f64,
    pub periods: f64,
    pub taps: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: Window,
}

impl SincDesign {
    pub fn new(cutoff_hz: f64, periods: f64, taps: usize) -> Self {
        Self {
            cutoff_hz,
            periods,
            taps,
            window: Window::default(),
        }
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Half length M = (taps - 1) / 2.
    pub fn half(&self) -> usize {
        self.taps.saturating_sub(1) / 2
    }

    /// Sample rate realized by the kernel: f_c * M_k / (2N).
    pub fn sample_rate(&self) -> f64 {
        self.cutoff_hz * self.taps as f64 / (2.0 * self.periods)
    }

    /// Checks every sinc kernel needs: positive parameters, odd tap count,
    /// and at least two samples per sinc period.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure_positive("cutoff_hz", self.cutoff_hz)?;
        ensure_positive("periods", self.periods)?;
        if self.taps < 3 {
            return Err(FirError::TooFewTaps {
                taps: self.taps,
                required: 3,
            });
        }
        if self.taps % 2 == 0 {
            return Err(FirError::EvenTapCount { taps: self.taps });
        }
        ensure_tap_count("sinc kernel", self.taps as f64)?;
        ensure_nyquist("sinc kernel", self.taps as f64 / (2.0 * self.periods))
    }

    /// Stricter check for designs built directly: M must also be even.
    fn validate_direct(&self) -> Result<()> {
        self.validate()?;
        let half = self.half();
        if half % 2 != 0 {
            return Err(FirError::OddHalfLength {
                taps: self.taps,
                half,
            });
        }
        Ok(())
    }

    /// Unit-sum windowed-sinc low-pass.
    pub fn lowpass(&self) -> Result<FilterKernel> {
        self.validate_direct()?;
        Ok(self.lowpass_kernel())
    }

    /// Spectrally inverted low-pass.
    pub fn highpass(&self) -> Result<FilterKernel> {
        self.validate_direct()?;
        Ok(self.highpass_kernel())
    }

    /// Evaluate the low-pass. Callers validate first.
    pub(crate) fn lowpass_kernel(&self) -> FilterKernel {
        let half = self.half();
        let extent = self.periods / self.cutoff_hz;
        let window_period = 2.0 * extent;
        let time = symmetric_axis(extent, half);

        let arg = 2.0 * self.cutoff_hz;
        let mut coefficients: Vec<f64> = time
            .iter()
            .map(|&t| sinc(arg * t) * self.window.at(t, window_period))
            .collect();

        let sum: f64 = coefficients.iter().sum();
        debug_assert!(sum.is_finite() && sum != 0.0);
        for c in coefficients.iter_mut() {
            *c /= sum;
        }

        let sample_rate = self.sample_rate();
        debug!(
            cutoff_hz = self.cutoff_hz,
            periods = self.periods,
            taps = self.taps,
            sample_rate,
            "low-pass kernel"
        );

        let mut diagnostics = KernelDiagnostics::new(FilterKind::LowPass, self.taps, sample_rate);
        diagnostics.f_cl = Some(self.cutoff_hz);
        diagnostics.nl = Some(self.periods);
        FilterKernel::new(coefficients, time, Normalization::UnitSum, diagnostics)
    }

    /// Evaluate the high-pass. Callers validate first.
    pub(crate) fn highpass_kernel(&self) -> FilterKernel {
        let lowpass = self.lowpass_kernel();
        let center = self.half();

        let mut coefficients: Vec<f64> = lowpass.coefficients().iter().map(|c| -c).collect();
        coefficients[center] += 1.0;

        let sample_rate = self.sample_rate();
        let mut diagnostics = KernelDiagnostics::new(FilterKind::HighPass, self.taps, sample_rate);
        diagnostics.f_ch = Some(self.cutoff_hz);
        diagnostics.nh = Some(self.periods);
        FilterKernel::new(
            coefficients,
            lowpass.time().to_vec(),
            Normalization::SpectralInversion,
            diagnostics,
        )
    }

    /// Same cutoff and span at 1/`lanes` of the sample rate.
    ///
    /// M shrinks by the lane count and is forced even again.
    pub fn decimated(&self, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        let mut half = self.half() / lanes;
        if half % 2 != 0 {
            half -= 1;
        }
        if half < 2 {
            return Err(FirError::TooFewTaps {
                taps: 2 * half + 1,
                required: 5,
            });
        }
        Ok(Self {
            taps: 2 * half + 1,
            ..*self
        })
    }
}
