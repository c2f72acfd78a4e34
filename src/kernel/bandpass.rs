use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{
    ensure_lanes, sinc::SincDesign, FilterKernel, FilterKind, KernelDiagnostics, Normalization,
};
use crate::{
    dsp::{
        convolve::{Convolver, Direct},
        window::{symmetric_axis, Window},
    },
    error::{ensure_nyquist, ensure_positive, ensure_tap_count, FirError, Result},
};

/*
Band-Pass by Cascade
====================

A band-pass kernel is a low-pass convolved with a high-pass:

    f_ch = center - bandwidth / 2     high-pass cut-on
    f_cl = center + bandwidth / 2     low-pass cutoff

    band = lowpass(f_cl, Nl, M_k) * highpass(f_ch, Nh, M_k)

Both halves have M_k taps over the same time span, so the cascade has
M_b = 2 M_k - 1 taps spanning twice that.

The two halves only share a sample grid when they span the same time,
i.e. Nl / f_cl == Nh / f_ch. Both variants pick Nl from Nh to keep it that way.

Carrier-Aligned
---------------

Sized from the carrier: the kernel should be sampled at about
center * sample_factor, over 2 Nh high-pass periods on each side.

    Nl  = Nh * f_cl / f_ch
    M_b = floor(center * sample_factor * 4 Nh / f_ch)
    M_k = floor((M_b + 1) / 2)
    M   = floor((M_k - 1) / 2), minus 1 if odd
    M_k = 2M + 1,  M_b = 2 M_k - 1

    realized rate = f_ch * M_b / (4 Nh),  axis spans +-2 Nh / f_ch

Fixed-Length
------------

The caller fixes the tap count Ns and the sample rate SR; the period
counts follow from them.

    M_k = floor((Ns + 1) / 2), plus 1 (and flagged) if even
    Nh  = M_k * f_ch / SR,  Nl = M_k * f_cl / SR
    halves use Nh / 2 and Nl / 2 periods

    realized rate = f_ch * M_b / (2 Nh),  axis spans +-Nh / f_ch

When M_k had to be bumped the cascade comes out two taps long, and one tap is
trimmed from each end so exactly Ns remain.
*/

/// Band-pass whose length follows from the carrier and a sample factor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarrierAlignedBandPass {
    pub center_hz: f64,
    pub bandwidth_hz: f64,
    /// High-pass period count Nh.
    pub hp_periods: f64,
    /// Kernel sample rate as a multiple of the center frequency.
    pub sample_factor: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: Window,
}

/// Band-pass with a caller-fixed tap count at a given sample rate.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLengthBandPass {
    pub center_hz: f64,
    pub bandwidth_hz: f64,
    pub taps: usize,
    pub sample_rate: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub window: Window,
}

/// Validated band edges (f_ch, f_cl).
fn band_edges(center_hz: f64, bandwidth_hz: f64) -> Result<(f64, f64)> {
    ensure_positive("center_hz", center_hz)?;
    ensure_positive("bandwidth_hz", bandwidth_hz)?;
    let f_ch = center_hz - bandwidth_hz / 2.0;
    if f_ch <= 0.0 {
        return Err(FirError::CutoffOrder {
            f_ch,
            center: center_hz,
            bandwidth: bandwidth_hz,
        });
    }
    Ok((f_ch, center_hz + bandwidth_hz / 2.0))
}

fn cascade(lowpass: &SincDesign, highpass: &SincDesign) -> Result<Vec<f64>> {
    let lp = lowpass.lowpass_kernel();
    let hp = highpass.highpass_kernel();
    Direct.convolve(lp.coefficients(), hp.coefficients())
}

impl CarrierAlignedBandPass {
    pub fn new(center_hz: f64, bandwidth_hz: f64, hp_periods: f64, sample_factor: f64) -> Self {
        Self {
            center_hz,
            bandwidth_hz,
            hp_periods,
            sample_factor,
            window: Window::default(),
        }
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// The two validated halves of the cascade plus M_b.
    fn halves(&self) -> Result<(SincDesign, SincDesign, usize)> {
        let (f_ch, f_cl) = band_edges(self.center_hz, self.bandwidth_hz)?;
        let nh = ensure_positive("hp_periods", self.hp_periods)?;
        ensure_positive("sample_factor", self.sample_factor)?;
        let nl = nh * f_cl / f_ch;

        let carrier_rate = self.center_hz * self.sample_factor;
        let m_b = ensure_tap_count(
            "carrier-aligned band-pass",
            (carrier_rate * 4.0 * nh / f_ch).floor(),
        )?;
        let m_k = (m_b + 1) / 2;
        let mut half = m_k.saturating_sub(1) / 2;
        if half % 2 != 0 {
            half -= 1;
        }
        let m_k = 2 * half + 1;

        let lowpass = SincDesign::new(f_cl, nl, m_k).window(self.window);
        let highpass = SincDesign::new(f_ch, nh, m_k).window(self.window);
        lowpass.validate()?;
        highpass.validate()?;
        Ok((lowpass, highpass, 2 * m_k - 1))
    }

    pub fn synthesize(&self) -> Result<FilterKernel> {
        let (lowpass, highpass, m_b) = self.halves()?;
        let coefficients = cascade(&lowpass, &highpass)?;

        let f_ch = highpass.cutoff_hz;
        let nh = highpass.periods;
        let time = symmetric_axis(2.0 * nh / f_ch, m_b / 2);
        let sample_rate = f_ch * m_b as f64 / (4.0 * nh);

        debug!(
            center_hz = self.center_hz,
            bandwidth_hz = self.bandwidth_hz,
            f_ch,
            f_cl = lowpass.cutoff_hz,
            nh,
            nl = lowpass.periods,
            m_k = lowpass.taps,
            m_b,
            sample_rate,
            "carrier-aligned band-pass kernel"
        );

        let diagnostics = KernelDiagnostics {
            m_k: lowpass.taps,
            m_b: Some(m_b),
            nh: Some(nh),
            nl: Some(lowpass.periods),
            f_ch: Some(f_ch),
            f_cl: Some(lowpass.cutoff_hz),
            center_hz: Some(self.center_hz),
            bandwidth_hz: Some(self.bandwidth_hz),
            ..KernelDiagnostics::new(FilterKind::BandPass, m_b, sample_rate)
        };
        Ok(FilterKernel::new(
            coefficients,
            time,
            Normalization::Cascade,
            diagnostics,
        ))
    }

    /// Same band at 1/`lanes` of the carrier sample factor.
    pub fn decimated(&self, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        Ok(Self {
            sample_factor: self.sample_factor / lanes as f64,
            ..*self
        })
    }
}

impl FixedLengthBandPass {
    pub fn new(center_hz: f64, bandwidth_hz: f64, taps: usize, sample_rate: f64) -> Self {
        Self {
            center_hz,
            bandwidth_hz,
            taps,
            sample_rate,
            window: Window::default(),
        }
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// The two validated halves of the cascade, and whether M_k was bumped.
    fn halves(&self) -> Result<(SincDesign, SincDesign, bool)> {
        let (f_ch, f_cl) = band_edges(self.center_hz, self.bandwidth_hz)?;
        let sample_rate = ensure_positive("sample_rate", self.sample_rate)?;
        if self.taps % 2 == 0 {
            return Err(FirError::EvenTapCount { taps: self.taps });
        }
        if self.taps < 5 {
            return Err(FirError::TooFewTaps {
                taps: self.taps,
                required: 5,
            });
        }
        ensure_tap_count("fixed-length band-pass", self.taps as f64)?;
        ensure_nyquist("fixed-length band-pass", sample_rate / f_cl)?;

        let mut m_k = (self.taps + 1) / 2;
        let bumped = m_k % 2 == 0;
        if bumped {
            m_k += 1;
        }
        let nh = m_k as f64 * f_ch / sample_rate;
        let nl = m_k as f64 * f_cl / sample_rate;

        let lowpass = SincDesign::new(f_cl, nl / 2.0, m_k).window(self.window);
        let highpass = SincDesign::new(f_ch, nh / 2.0, m_k).window(self.window);
        lowpass.validate()?;
        highpass.validate()?;
        Ok((lowpass, highpass, bumped))
    }

    pub fn synthesize(&self) -> Result<FilterKernel> {
        let (lowpass, highpass, trimmed) = self.halves()?;
        let m_k = lowpass.taps;
        let m_b = 2 * m_k - 1;

        let f_ch = highpass.cutoff_hz;
        let nh = 2.0 * highpass.periods;
        let nl = 2.0 * lowpass.periods;

        let mut coefficients = cascade(&lowpass, &highpass)?;
        let mut time = symmetric_axis(nh / f_ch, m_k - 1);
        if trimmed {
            for seq in [&mut coefficients, &mut time] {
                seq.pop();
                seq.remove(0);
            }
        }
        let sample_rate = f_ch * m_b as f64 / (2.0 * nh);

        debug!(
            center_hz = self.center_hz,
            bandwidth_hz = self.bandwidth_hz,
            requested_taps = self.taps,
            f_ch,
            f_cl = lowpass.cutoff_hz,
            nh,
            nl,
            m_k,
            m_b,
            trimmed,
            sample_rate,
            "fixed-length band-pass kernel"
        );

        let diagnostics = KernelDiagnostics {
            m_k,
            m_b: Some(m_b),
            nh: Some(nh),
            nl: Some(nl),
            f_ch: Some(f_ch),
            f_cl: Some(lowpass.cutoff_hz),
            center_hz: Some(self.center_hz),
            bandwidth_hz: Some(self.bandwidth_hz),
            trimmed,
            ..KernelDiagnostics::new(FilterKind::BandPass, coefficients.len(), sample_rate)
        };
        Ok(FilterKernel::new(
            coefficients,
            time,
            Normalization::Cascade,
            diagnostics,
        ))
    }

    /// Same band on a stream decimated by `lanes`.
    ///
    /// Ns - 1 has to split evenly across the lanes; the lane tap count is
    /// (Ns - 1) / lanes, bumped to odd.
    pub fn decimated(&self, lanes: usize) -> Result<Self> {
        let lanes = ensure_lanes(lanes)?;
        let span = self.taps.saturating_sub(1);
        if span % lanes != 0 {
            return Err(FirError::NonIntegerRatio {
                context: "fixed-length band-pass decimation",
                numerator: span,
                denominator: lanes,
            });
        }
        let taps = span / lanes;
        Ok(Self {
            taps: if taps % 2 == 0 { taps + 1 } else { taps },
            sample_rate: self.sample_rate / lanes as f64,
            ..*self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::spectrum::gain_at;

    const SR: f64 = 2_457.6e6;

    #[test]
    fn fixed_length_honors_requested_taps() {
        let kernel = FixedLengthBandPass::new(80e6, 50e6, 249, SR)
            .synthesize()
            .unwrap();
        let diag = kernel.diagnostics();
        assert_eq!(kernel.len(), 249);
        assert_eq!(kernel.time().len(), 249);
        assert_eq!(diag.m_k, 125);
        assert_eq!(diag.m_b, Some(249));
        assert!(!diag.trimmed);
        assert!((diag.sample_rate - SR).abs() / SR < 0.01);
        assert_eq!(diag.f_ch, Some(55e6));
        assert_eq!(diag.f_cl, Some(105e6));
    }

    #[test]
    fn fixed_length_trims_when_half_was_even() {
        let kernel = FixedLengthBandPass::new(80e6, 50e6, 251, SR)
            .synthesize()
            .unwrap();
        let diag = kernel.diagnostics();
        assert_eq!(kernel.len(), 251);
        assert_eq!(diag.m_k, 127);
        assert_eq!(diag.m_b, Some(253));
        assert!(diag.trimmed);
        assert!(kernel.asymmetry() < 1e-14);
    }

    #[test]
    fn carrier_aligned_keeps_half_length_even() {
        let kernel = CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 30.0)
            .synthesize()
            .unwrap();
        let diag = kernel.diagnostics();
        // M_b = floor(2.4e9 * 8 / 55e6) = 349 -> M_k = 175 -> M = 87 -> 86
        assert_eq!(diag.m_k, 173);
        assert_eq!(diag.m_b, Some(345));
        assert_eq!(kernel.len(), 345);
        assert!((kernel.time()[0] + 4.0 / 55e6).abs() < 1e-20);
        assert!(kernel.asymmetry() < 1e-14);
        let nl = diag.nl.unwrap();
        assert!((nl - 2.0 * 105.0 / 55.0).abs() < 1e-12);
        // f_ch * M_b / (4 Nh)
        assert!((diag.sample_rate - 55e6 * 345.0 / 8.0).abs() < 1.0);
    }

    #[test]
    fn huge_sample_factor_is_a_config_error() {
        let err = CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 1e30)
            .synthesize()
            .unwrap_err();
        assert!(matches!(err, FirError::TooManyTaps { .. }), "{err}");
        assert!(err.is_config());

        assert!(matches!(
            FixedLengthBandPass::new(80e6, 50e6, usize::MAX, SR).synthesize(),
            Err(FirError::TooManyTaps { .. })
        ));
    }

    #[test]
    fn passes_the_band_and_blocks_dc() {
        let design = CarrierAlignedBandPass::new(80e6, 50e6, 8.0, 30.0);
        let kernel = design.synthesize().unwrap();
        let rate = kernel.diagnostics().sample_rate;

        let dc = gain_at(kernel.coefficients(), rate, 0.0);
        let center = gain_at(kernel.coefficients(), rate, 80e6);
        assert!(dc < 1e-9, "dc={dc}");
        assert!(center > 0.8, "center={center}");
        assert!(center > dc);
    }

    #[test]
    fn rejects_invalid_band() {
        let bad = [
            CarrierAlignedBandPass::new(80e6, 0.0, 2.0, 30.0),
            CarrierAlignedBandPass::new(80e6, -5e6, 2.0, 30.0),
            CarrierAlignedBandPass::new(80e6, 50e6, 0.0, 30.0),
            CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 0.0),
            CarrierAlignedBandPass::new(20e6, 50e6, 2.0, 30.0),
            // 80 MHz sampled at 80 MHz
            CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 1.0),
        ];
        for design in bad {
            let err = design.synthesize().unwrap_err();
            assert!(err.is_config(), "{design:?} -> {err}");
        }
        assert!(matches!(
            CarrierAlignedBandPass::new(20e6, 50e6, 2.0, 30.0).synthesize(),
            Err(FirError::CutoffOrder { .. })
        ));
        assert!(matches!(
            CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 1.0).synthesize(),
            Err(FirError::Nyquist { .. })
        ));
    }

    #[test]
    fn rejects_invalid_fixed_length() {
        assert!(matches!(
            FixedLengthBandPass::new(80e6, 50e6, 250, SR).synthesize(),
            Err(FirError::EvenTapCount { taps: 250 })
        ));
        assert!(matches!(
            FixedLengthBandPass::new(80e6, 50e6, 249, 200e6).synthesize(),
            Err(FirError::Nyquist { .. })
        ));
        assert!(FixedLengthBandPass::new(80e6, 50e6, 3, SR)
            .synthesize()
            .is_err());
    }

    #[test]
    fn decimation_divides_taps_and_rate() {
        let design = FixedLengthBandPass::new(80e6, 50e6, 249, SR);
        let lane = design.decimated(4).unwrap();
        // 248 / 4 = 62 -> 63
        assert_eq!(lane.taps, 63);
        assert_eq!(lane.sample_rate, SR / 4.0);
        assert_eq!(design.decimated(1).unwrap(), design);
        assert!(matches!(
            design.decimated(5),
            Err(FirError::NonIntegerRatio { .. })
        ));

        let carrier = CarrierAlignedBandPass::new(80e6, 50e6, 2.0, 32.0);
        assert_eq!(carrier.decimated(4).unwrap().sample_factor, 8.0);
    }
}
