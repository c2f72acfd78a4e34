//! Error types for kernel synthesis and the lane pipeline.
//!
//! Every operation either succeeds completely or reports exactly one of these
//! conditions. Configuration errors are detected from the inputs alone, before
//! any coefficient is computed.

use thiserror::Error;

/// Result type alias for polyfir operations.
pub type Result<T> = std::result::Result<T, FirError>;

/// Largest tap count any kernel may have, given or derived.
pub const MAX_TAPS: usize = 1 << 24;

/// Errors raised by synthesis, convolution, and reconstruction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FirError {
    /// A parameter that must be strictly positive (and finite) was not.
    #[error("Invalid configuration: {name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    /// A derived sample-rate to frequency ratio fell below 2.
    #[error("Nyquist violation: {context} sample-rate ratio is {ratio:.4}, must be >= 2")]
    Nyquist { context: &'static str, ratio: f64 },

    /// Sinc kernels need an odd tap count so they have a center tap.
    #[error("Invalid configuration: tap count must be odd, got {taps}")]
    EvenTapCount { taps: usize },

    /// M = (taps - 1) / 2 must be even for sinc kernels built directly.
    #[error("Invalid configuration: half length (taps - 1) / 2 must be even, got {half} for {taps} taps")]
    OddHalfLength { taps: usize, half: usize },

    /// Not enough taps to build the requested kernel.
    #[error("Invalid configuration: need at least {required} taps, got {taps}")]
    TooFewTaps { taps: usize, required: usize },

    /// A given or derived tap count is not finite or exceeds [`MAX_TAPS`].
    #[error("Invalid configuration: {context} needs {taps} taps, limit is {limit}")]
    TooManyTaps {
        context: &'static str,
        taps: f64,
        limit: usize,
    },

    /// A ratio that the design requires to be integral was not.
    #[error("Invalid configuration: {context} requires {numerator} to be divisible by {denominator}")]
    NonIntegerRatio {
        context: &'static str,
        numerator: usize,
        denominator: usize,
    },

    /// The band edges of a band-pass design are out of order.
    #[error("Invalid configuration: high-pass cut-on {f_ch} Hz must be positive (center {center} Hz, bandwidth {bandwidth} Hz)")]
    CutoffOrder {
        f_ch: f64,
        center: f64,
        bandwidth: f64,
    },

    /// The lane count was zero.
    #[error("Invalid configuration: lane count must be at least 1")]
    ZeroLanes,

    /// An input sequence was empty.
    #[error("Empty sequence provided for {context}")]
    EmptySignal { context: &'static str },

    /// Lane kernels in one set must agree in count and length.
    #[error("Lane kernel mismatch: expected {expected}, got {actual}")]
    LaneKernelMismatch { expected: usize, actual: usize },

    /// The FFT length cannot hold the sequence.
    #[error("FFT length {fft_len} is shorter than sequence length {len}")]
    FftLength { fft_len: usize, len: usize },

    /// Unsupported fixed-point word format.
    #[error("Invalid fixed-point format: {sample_bits} sample bits, {fraction_bits} fraction bits")]
    FixedPointFormat { sample_bits: u32, fraction_bits: u32 },

    /// The lane reconstruction disagreed with the direct convolution.
    #[error("Reconstruction mismatch at index {index}: expected {expected}, got {actual}")]
    ReconstructionMismatch {
        index: usize,
        expected: f64,
        actual: f64,
    },
}

impl FirError {
    /// Create a non-positive parameter error.
    pub fn non_positive(name: &'static str, value: f64) -> Self {
        Self::NonPositive { name, value }
    }

    /// Create an empty input error.
    pub fn empty(context: &'static str) -> Self {
        Self::EmptySignal { context }
    }

    /// True for errors detectable analytically from configuration inputs.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::NonPositive { .. }
                | Self::Nyquist { .. }
                | Self::EvenTapCount { .. }
                | Self::OddHalfLength { .. }
                | Self::TooFewTaps { .. }
                | Self::TooManyTaps { .. }
                | Self::NonIntegerRatio { .. }
                | Self::CutoffOrder { .. }
                | Self::ZeroLanes
                | Self::FixedPointFormat { .. }
        )
    }
}

/// Reject zero, negative, and non-finite values.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FirError::non_positive(name, value))
    }
}

/// Convert a tap count computed in `f64` once it is known to fit.
pub(crate) fn ensure_tap_count(context: &'static str, taps: f64) -> Result<usize> {
    if taps.is_finite() && (0.0..=MAX_TAPS as f64).contains(&taps) {
        Ok(taps as usize)
    } else {
        Err(FirError::TooManyTaps {
            context,
            taps,
            limit: MAX_TAPS,
        })
    }
}

/// Reject sample-rate to frequency ratios below 2.
pub(crate) fn ensure_nyquist(context: &'static str, ratio: f64) -> Result<()> {
    if ratio >= 2.0 {
        Ok(())
    } else {
        Err(FirError::Nyquist { context, ratio })
    }
}
