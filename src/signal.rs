use std::f64::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, FirError, Result};

/// Ordered real samples with the rate they were taken at.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Wrap samples, rejecting empty input and non-positive rates.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(FirError::empty("signal"));
        }
        ensure_positive("sample_rate", sample_rate)?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// `len` samples of sin(2*pi*f*t), t = i / sample_rate.
    ///
    /// Test and scenario input only; waveform generation proper lives outside
    /// this crate.
    pub fn sine(frequency: f64, sample_rate: f64, len: usize) -> Result<Self> {
        ensure_positive("frequency", frequency)?;
        ensure_positive("sample_rate", sample_rate)?;
        let samples = (0..len)
            .map(|i| (TAU * frequency * i as f64 / sample_rate).sin())
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: construction rejects empty signals.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
