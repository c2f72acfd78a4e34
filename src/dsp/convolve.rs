//! Full linear convolution backends.
//!
//! Every backend computes `y[k] = sum_j x[k - j] * h[j]` over the full overlap
//! range, producing `x.len() + h.len() - 1` samples. They differ only in the
//! numeric path: plain `f64` products, frequency-domain products, or the
//! hardware fixed-point emulation in [`super::fixed_point`].

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{FirError, Result};

/// A numeric backend for full linear convolution.
///
/// Backends are shared across lane tasks, so they must be `Sync`.
pub trait Convolver: Sync {
    /// Convolve `signal` with `kernel`. Both must be non-empty.
    fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>>;
}

impl<C: Convolver + ?Sized> Convolver for &C {
    fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>> {
        (**self).convolve(signal, kernel)
    }
}

pub(crate) fn check_operands(signal: &[f64], kernel: &[f64]) -> Result<usize> {
    if signal.is_empty() {
        return Err(FirError::empty("convolution signal"));
    }
    if kernel.is_empty() {
        return Err(FirError::empty("convolution kernel"));
    }
    Ok(signal.len() + kernel.len() - 1)
}

/// Time-domain `f64` convolution. The reference oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Direct;

impl Convolver for Direct {
    fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>> {
        let out_len = check_operands(signal, kernel)?;
        let mut out = vec![0.0; out_len];
        for (i, &x) in signal.iter().enumerate() {
            if x == 0.0 {
                continue;
            }
            for (o, &h) in out[i..i + kernel.len()].iter_mut().zip(kernel) {
                *o += x * h;
            }
        }
        Ok(out)
    }
}

/// Convolution through one forward/inverse FFT pair of length n + m - 1.
///
/// Faster than [`Direct`] for long kernels; agrees with it to roughly
/// 1e-12 relative for well-scaled inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fft;

impl Convolver for Fft {
    fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>> {
        let out_len = check_operands(signal, kernel)?;

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(out_len);
        let inverse = planner.plan_fft_inverse(out_len);

        let padded = |data: &[f64]| {
            let mut buf = vec![Complex::new(0.0, 0.0); out_len];
            for (slot, &v) in buf.iter_mut().zip(data) {
                slot.re = v;
            }
            buf
        };

        let mut x = padded(signal);
        let mut h = padded(kernel);
        forward.process(&mut x);
        forward.process(&mut h);

        for (a, b) in x.iter_mut().zip(h.iter()) {
            *a *= *b;
        }
        inverse.process(&mut x);

        // rustfft leaves the inverse unnormalized
        let scale = 1.0 / out_len as f64;
        Ok(x.into_iter().map(|c| c.re * scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_matches_hand_computed() {
        let y = Direct.convolve(&[1.0, 2.0, 3.0], &[0.0, 1.0, 0.5]).unwrap();
        assert_eq!(y, vec![0.0, 1.0, 2.5, 4.0, 1.5]);
    }

    #[test]
    fn direct_is_commutative_in_length() {
        let a = [1.0, -1.0, 2.0, 0.5, 3.0];
        let b = [0.25, 0.5];
        let ab = Direct.convolve(&a, &b).unwrap();
        let ba = Direct.convolve(&b, &a).unwrap();
        assert_eq!(ab.len(), 6);
        for (x, y) in ab.iter().zip(ba.iter()) {
            assert!((x - y).abs() < 1e-15);
        }
    }

    #[test]
    fn single_tap_kernel_scales_signal() {
        let y = Direct.convolve(&[1.0, 2.0, 3.0], &[2.0]).unwrap();
        assert_eq!(y, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn rejects_empty_operands() {
        assert!(matches!(
            Direct.convolve(&[], &[1.0]),
            Err(FirError::EmptySignal { .. })
        ));
        assert!(Fft.convolve(&[1.0], &[]).is_err());
    }

    #[test]
    fn fft_agrees_with_direct() {
        let signal: Vec<f64> = (0..97).map(|i| ((i * 7) % 13) as f64 - 6.0).collect();
        let kernel: Vec<f64> = (0..31).map(|i| (i as f64 * 0.3).cos()).collect();
        let direct = Direct.convolve(&signal, &kernel).unwrap();
        let fft = Fft.convolve(&signal, &kernel).unwrap();
        assert_eq!(direct.len(), fft.len());
        let peak = direct.iter().fold(1.0f64, |acc, v| acc.max(v.abs()));
        for (d, f) in direct.iter().zip(fft.iter()) {
            assert!((d - f).abs() <= 1e-9 * peak, "direct={d}, fft={f}");
        }
    }
}
