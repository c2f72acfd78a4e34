//! Magnitude responses of kernels and sequences.
//!
//! Computes the data a plotting collaborator would draw; nothing here renders.

use std::f64::consts::TAU;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{ensure_positive, FirError, Result};

/// Magnitude of the zero-padded FFT of `coefficients`.
///
/// Returns `(frequency_hz, |H|)` for bins `0..=fft_len / 2`.
pub fn magnitude_response(
    coefficients: &[f64],
    sample_rate: f64,
    fft_len: usize,
) -> Result<Vec<(f64, f64)>> {
    if coefficients.is_empty() {
        return Err(FirError::empty("spectrum input"));
    }
    ensure_positive("sample_rate", sample_rate)?;
    if fft_len < coefficients.len() {
        return Err(FirError::FftLength {
            fft_len,
            len: coefficients.len(),
        });
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_len);

    let mut buffer = vec![Complex::new(0.0, 0.0); fft_len];
    for (slot, &c) in buffer.iter_mut().zip(coefficients) {
        slot.re = c;
    }
    fft.process(&mut buffer);

    let bin_hz = sample_rate / fft_len as f64;
    Ok(buffer[..=fft_len / 2]
        .iter()
        .enumerate()
        .map(|(i, bin)| (i as f64 * bin_hz, bin.norm()))
        .collect())
}

/// Exact DTFT magnitude of `coefficients` at `frequency` Hz.
pub fn gain_at(coefficients: &[f64], sample_rate: f64, frequency: f64) -> f64 {
    let omega = TAU * frequency / sample_rate;
    let (re, im) = coefficients
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (n, &c)| {
            let phase = omega * n as f64;
            (re + c * phase.cos(), im - c * phase.sin())
        });
    (re * re + im * im).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_response_peaks_at_dc() {
        let kernel = vec![0.25; 4];
        let response = magnitude_response(&kernel, 1_000.0, 64).unwrap();
        assert_eq!(response.len(), 33);
        assert_eq!(response[0].0, 0.0);
        assert!((response[0].1 - 1.0).abs() < 1e-12);
        // first null of a 4-tap box at fs/4
        assert!(response[16].1 < 1e-12);
    }

    #[test]
    fn gain_at_matches_fft_bins() {
        let kernel: Vec<f64> = (0..9).map(|i| 1.0 / (i as f64 + 1.0)).collect();
        let response = magnitude_response(&kernel, 8_000.0, 32).unwrap();
        for &(freq, mag) in response.iter().step_by(5) {
            assert!((gain_at(&kernel, 8_000.0, freq) - mag).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_short_fft() {
        assert!(matches!(
            magnitude_response(&[1.0; 8], 1.0, 4),
            Err(FirError::FftLength { .. })
        ));
    }
}
