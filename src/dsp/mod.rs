//! Low-level numeric primitives used by kernel synthesis and the lane pipeline.
//!
//! These pieces are pure functions over slices: no configuration, no state
//! between calls. Higher layers (`kernel`, `lanes`, `pipeline`) combine them
//! into designs and verification runs.

/// Full linear convolution backends (time domain and FFT).
pub mod convolve;
/// FPGA-style multiply-and-shift convolution backend.
pub mod fixed_point;
/// FFT magnitude responses for kernel inspection.
pub mod spectrum;
/// Sinc, tapering windows, and time axes.
pub mod window;

pub use convolve::{Convolver, Direct, Fft};
pub use fixed_point::FixedPoint;
pub use window::Window;
