//! FIR kernel synthesis.
//!
//! Every design is an immutable parameter struct; `synthesize` is a pure
//! function of those parameters, so the same design always yields bit-identical
//! coefficients. Validation runs before any coefficient is computed.
//!
//! | design                 | built from                      | normalization        |
//! | ---------------------- | ------------------------------- | -------------------- |
//! | moving average         | box of 1/L                      | unit sum             |
//! | low-pass               | sinc x window                   | unit sum             |
//! | high-pass              | low-pass, spectrally inverted   | sums to zero         |
//! | band-pass (carrier)    | low-pass * high-pass            | cascade of the two   |
//! | band-pass (fixed taps) | low-pass * high-pass, trimmed   | cascade of the two   |

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Band-pass designs built by cascading a low-pass and a high-pass kernel.
pub mod bandpass;
/// Box-car averaging kernels.
pub mod moving_average;
/// Windowed-sinc low-pass and high-pass kernels.
pub mod sinc;

pub use bandpass::{CarrierAlignedBandPass, FixedLengthBandPass};
pub use moving_average::MovingAverage;
pub use sinc::SincDesign;

/// Which response a kernel implements.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    MovingAverage,
    LowPass,
    HighPass,
    BandPass,
}

/// How the coefficients were scaled after evaluation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Divided by their sum (DC gain of exactly 1).
    UnitSum,
    /// Unit-sum low-pass negated with 1 added at the center (DC gain 0).
    SpectralInversion,
    /// Convolution of a unit-sum low-pass and an inverted high-pass.
    Cascade,
    /// Scaled by an explicit factor (lane kernels re-synthesized at 1/N rate).
    Scaled,
}

/// Derived parameters reported by synthesis.
///
/// Fields that do not apply to a filter kind are `None`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDiagnostics {
    pub kind: FilterKind,
    /// Length of the returned coefficient sequence.
    pub taps: usize,
    /// Length of each sinc half (low/high-pass) or of the whole box.
    pub m_k: usize,
    /// Length of the cascade before any trim.
    pub m_b: Option<usize>,
    /// High-pass period count.
    pub nh: Option<f64>,
    /// Low-pass period count.
    pub nl: Option<f64>,
    /// High-pass cut-on frequency.
    pub f_ch: Option<f64>,
    /// Low-pass cutoff frequency.
    pub f_cl: Option<f64>,
    pub center_hz: Option<f64>,
    pub bandwidth_hz: Option<f64>,
    /// Sample rate the kernel actually realizes.
    pub sample_rate: f64,
    /// One sample was trimmed from each end to honor the requested length.
    pub trimmed: bool,
}

impl KernelDiagnostics {
    pub(crate) fn new(kind: FilterKind, taps: usize, sample_rate: f64) -> Self {
        Self {
            kind,
            taps,
            m_k: taps,
            m_b: None,
            nh: None,
            nl: None,
            f_ch: None,
            f_cl: None,
            center_hz: None,
            bandwidth_hz: None,
            sample_rate,
            trimmed: false,
        }
    }
}

/// An immutable FIR kernel with its time axis and synthesis diagnostics.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    coefficients: Vec<f64>,
    time: Vec<f64>,
    normalization: Normalization,
    diagnostics: KernelDiagnostics,
}

impl FilterKernel {
    pub(crate) fn new(
        coefficients: Vec<f64>,
        time: Vec<f64>,
        normalization: Normalization,
        diagnostics: KernelDiagnostics,
    ) -> Self {
        debug_assert_eq!(coefficients.len(), time.len());
        debug_assert_eq!(coefficients.len(), diagnostics.taps);
        Self {
            coefficients,
            time,
            normalization,
            diagnostics,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Time of each coefficient in seconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn diagnostics(&self) -> &KernelDiagnostics {
        &self.diagnostics
    }

    pub fn kind(&self) -> FilterKind {
        self.diagnostics.kind
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Sum of the coefficients (the DC gain).
    pub fn sum(&self) -> f64 {
        self.coefficients.iter().sum()
    }

    /// Largest |h[i] - h[len - 1 - i]|.
    pub fn asymmetry(&self) -> f64 {
        self.coefficients
            .iter()
            .zip(self.coefficients.iter().rev())
            .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()))
    }

    /// Same kernel with every coefficient multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
            time: self.time.clone(),
            normalization: Normalization::Scaled,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Any kernel design the synthesizer understands.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDesign {
    MovingAverage(MovingAverage),
    LowPass(SincDesign),
    HighPass(SincDesign),
    BandPass(CarrierAlignedBandPass),
    FixedLengthBandPass(FixedLengthBandPass),
}

impl FilterDesign {
    /// Validate and evaluate the design.
    pub fn synthesize(&self) -> Result<FilterKernel> {
        match self {
            FilterDesign::MovingAverage(design) => design.synthesize(),
            FilterDesign::LowPass(design) => design.lowpass(),
            FilterDesign::HighPass(design) => design.highpass(),
            FilterDesign::BandPass(design) => design.synthesize(),
            FilterDesign::FixedLengthBandPass(design) => design.synthesize(),
        }
    }

    /// The same response designed for a stream decimated by `lanes`.
    pub fn decimated(&self, lanes: usize) -> Result<FilterDesign> {
        Ok(match self {
            FilterDesign::MovingAverage(design) => {
                FilterDesign::MovingAverage(design.decimated(lanes)?)
            }
            FilterDesign::LowPass(design) => FilterDesign::LowPass(design.decimated(lanes)?),
            FilterDesign::HighPass(design) => FilterDesign::HighPass(design.decimated(lanes)?),
            FilterDesign::BandPass(design) => FilterDesign::BandPass(design.decimated(lanes)?),
            FilterDesign::FixedLengthBandPass(design) => {
                FilterDesign::FixedLengthBandPass(design.decimated(lanes)?)
            }
        })
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterDesign::MovingAverage(_) => FilterKind::MovingAverage,
            FilterDesign::LowPass(_) => FilterKind::LowPass,
            FilterDesign::HighPass(_) => FilterKind::HighPass,
            FilterDesign::BandPass(_) | FilterDesign::FixedLengthBandPass(_) => {
                FilterKind::BandPass
            }
        }
    }
}

impl From<MovingAverage> for FilterDesign {
    fn from(design: MovingAverage) -> Self {
        FilterDesign::MovingAverage(design)
    }
}

impl From<CarrierAlignedBandPass> for FilterDesign {
    fn from(design: CarrierAlignedBandPass) -> Self {
        FilterDesign::BandPass(design)
    }
}

impl From<FixedLengthBandPass> for FilterDesign {
    fn from(design: FixedLengthBandPass) -> Self {
        FilterDesign::FixedLengthBandPass(design)
    }
}

/// Ensure a lane count is usable for decimation.
pub(crate) fn ensure_lanes(lanes: usize) -> Result<usize> {
    if lanes == 0 {
        Err(crate::error::FirError::ZeroLanes)
    } else {
        Ok(lanes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn design_dispatch_reports_kind() {
        let lp = FilterDesign::LowPass(SincDesign::new(1_000.0, 2.0, 33));
        let hp = FilterDesign::HighPass(SincDesign::new(1_000.0, 2.0, 33));
        assert_eq!(lp.synthesize().unwrap().kind(), FilterKind::LowPass);
        assert_eq!(hp.synthesize().unwrap().kind(), FilterKind::HighPass);
        assert_eq!(lp.kind(), FilterKind::LowPass);
    }

    #[test]
    fn scaled_kernel_keeps_axis_and_marks_normalization() {
        let kernel = MovingAverage::with_length(4, 1_000.0).synthesize().unwrap();
        let scaled = kernel.scaled(0.5);
        assert_eq!(scaled.time(), kernel.time());
        assert_eq!(scaled.normalization(), Normalization::Scaled);
        assert!((scaled.sum() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn zero_lanes_is_rejected_for_every_design() {
        let design = FilterDesign::from(MovingAverage::with_length(8, 1_000.0));
        assert!(matches!(
            design.decimated(0),
            Err(crate::error::FirError::ZeroLanes)
        ));
    }
}
