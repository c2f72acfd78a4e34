use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::convolve::{check_operands, Convolver};
use crate::error::{FirError, Result};

/*
Fixed-Point Fractional Multiply
===============================

The FPGA has no floating point. Samples arrive as signed R-bit integers and
kernel taps are fractions, so each product x * h is done as

    h_q = floor(h * (2^F - 1))            (precomputed per tap)
    x * h  ~=  (x_q * h_q) >> F           (one integer multiply, one shift)

With the default R = 16 and F = 2 * (R - 1) = 30, a 16-bit sample times a
30-bit coefficient is a 46-bit product, and the shift brings it back to a
16-bit result.

Samples are quantized the way the ADC path scales them:

    x_q = trunc(x * 2^(R-1)), clamped to [-2^(R-1), 2^(R-1) - 1]

and the integer sum is rescaled by 2^-(R-1) on the way out.

Error Budget
------------

Measured in output LSBs (2^-(R-1)) for inputs in [-1, 1], per output sample:

    shift floors               < 1 per tap             ->  K
    sample quantization        < 1 LSB times |h_j|     ->  sum |h|
    coefficient quantization   |x_q| (|h_j| + 1) 2^-F  ->  2^(R-1-F) (K + sum |h|)

where K is the kernel length. `FixedPoint::error_bound` returns the total in
floating-point units.
*/

/// Hardware multiply-and-shift convolution emulation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    sample_bits: u32,
    fraction_bits: u32,
}

impl Default for FixedPoint {
    fn default() -> Self {
        Self {
            sample_bits: 16,
            fraction_bits: 30,
        }
    }
}

impl FixedPoint {
    /// `sample_bits` wide samples with `2 * (sample_bits - 1)` fraction bits.
    ///
    /// Above 21 sample bits that default no longer fits the 62-bit product, so
    /// the fraction bits are clamped to `min(48, 62 - sample_bits)`.
    pub fn new(sample_bits: u32) -> Result<Self> {
        let fraction_bits = (2 * sample_bits.saturating_sub(1))
            .min(48)
            .min(62u32.saturating_sub(sample_bits));
        Self::with_fraction_bits(sample_bits, fraction_bits)
    }

    pub fn with_fraction_bits(sample_bits: u32, fraction_bits: u32) -> Result<Self> {
        let valid = (2..=32).contains(&sample_bits)
            && (1..=48).contains(&fraction_bits)
            && sample_bits + fraction_bits <= 62;
        if !valid {
            return Err(FirError::FixedPointFormat {
                sample_bits,
                fraction_bits,
            });
        }
        Ok(Self {
            sample_bits,
            fraction_bits,
        })
    }

    pub fn sample_bits(&self) -> u32 {
        self.sample_bits
    }

    pub fn fraction_bits(&self) -> u32 {
        self.fraction_bits
    }

    /// 2^(R-1): the integer value of a full-scale sample.
    fn sample_scale(&self) -> i64 {
        1i64 << (self.sample_bits - 1)
    }

    /// Quantize one sample to a signed R-bit integer.
    pub fn quantize_sample(&self, x: f64) -> i64 {
        let scale = self.sample_scale();
        let q = (x * scale as f64).trunc() as i64;
        q.clamp(-scale, scale - 1)
    }

    /// Quantize one coefficient to F fraction bits.
    pub fn quantize_coefficient(&self, h: f64) -> i64 {
        let mult = ((1i64 << self.fraction_bits) - 1) as f64;
        (h * mult).floor() as i64
    }

    /// The hardware product: `(x_q * h_q) >> F` with an arithmetic shift.
    #[inline]
    pub fn fractional_mult(&self, x_q: i64, h_q: i64) -> i128 {
        (x_q as i128 * h_q as i128) >> self.fraction_bits
    }

    /// Worst-case |fixed - float| per output sample for inputs in [-1, 1].
    pub fn error_bound(&self, kernel: &[f64]) -> f64 {
        let taps = kernel.len() as f64;
        let sum_abs: f64 = kernel.iter().map(|h| h.abs()).sum();
        let coeff_term = 2f64.powi(self.sample_bits as i32 - 1 - self.fraction_bits as i32)
            * (taps + sum_abs);
        (taps + sum_abs + coeff_term) / self.sample_scale() as f64
    }
}

impl Convolver for FixedPoint {
    fn convolve(&self, signal: &[f64], kernel: &[f64]) -> Result<Vec<f64>> {
        let out_len = check_operands(signal, kernel)?;

        let x_q: Vec<i64> = signal.iter().map(|&x| self.quantize_sample(x)).collect();
        let h_q: Vec<i64> = kernel.iter().map(|&h| self.quantize_coefficient(h)).collect();

        let mut acc = vec![0i128; out_len];
        for (i, &x) in x_q.iter().enumerate() {
            if x == 0 {
                continue;
            }
            for (o, &h) in acc[i..i + h_q.len()].iter_mut().zip(&h_q) {
                *o += self.fractional_mult(x, h);
            }
        }

        debug!(
            sample_bits = self.sample_bits,
            fraction_bits = self.fraction_bits,
            len = out_len,
            "fixed-point convolution"
        );

        let scale = self.sample_scale() as f64;
        Ok(acc.into_iter().map(|v| v as f64 / scale).collect())
    }
}
