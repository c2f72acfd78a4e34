use std::f64::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Windowed Sinc
=============

An ideal low-pass filter has an infinitely long sinc impulse response. To get
a finite FIR kernel we cut the sinc off after a whole number of periods and
taper the cut with a window so the truncation does not ring in frequency.

Vocabulary
----------

  sinc(x)     sin(pi*x) / (pi*x), with sinc(0) = 1. Evaluated at 2*fc*t this
              has its first zero crossings at t = +-1/(2*fc).

  period      1/fc for the kernels here: the time axis is measured in these
              units and a design asks for N of them on each side of t = 0.

  window      A taper that is 1 in the middle and 0 at both ends of the axis.
              Its period T_w = 2 * N / fc is exactly the span of the axis.

              u = (t + T_w/2) / T_w        (0 at the left edge, 1 at the right)

              Hann      0.5 - 0.5 cos(2 pi u)
              Blackman  0.42 - 0.5 cos(2 pi u) + 0.08 cos(4 pi u)

              Both are evaluated through v = t / T_w = u - 1/2, where
              cos(2 pi u) = -cos(2 pi v). cos is even, so w(-t) == w(t) bit for
              bit and the kernels come out exactly symmetric.

Blackman trades a wider main lobe for much lower side lobes (about -58 dB
versus -31 dB for Hann). Hann is the raised cosine the hardware prototype
was tuned against.
*/

/// Tapering window applied to a truncated sinc.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    #[default]
    Blackman,
    Hann,
}

impl Window {
    /// Window value at time `t` for a window of period `period` centered on 0.
    #[inline]
    pub fn at(self, t: f64, period: f64) -> f64 {
        let v = t / period;
        match self {
            Window::Blackman => 0.42 + 0.5 * (TAU * v).cos() + 0.08 * (2.0 * TAU * v).cos(),
            Window::Hann => 0.5 + 0.5 * (TAU * v).cos(),
        }
    }
}

/// Normalized sinc: sin(pi x) / (pi x).
#[inline]
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// `len` evenly spaced points from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (len - 1) as f64;
            (0..len)
                .map(|i| if i == len - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Symmetric time axis of `2 * half + 1` points spanning `[-extent, extent]`.
///
/// The right half is built first and the left half is its exact negated
/// mirror, so `axis[i] == -axis[len - 1 - i]` bit for bit.
pub fn symmetric_axis(extent: f64, half: usize) -> Vec<f64> {
    let right = linspace(0.0, extent, half + 1);
    let mut axis: Vec<f64> = right[1..].iter().rev().map(|&t| -t).collect();
    axis.extend_from_slice(&right);
    axis
}
