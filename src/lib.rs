pub mod dsp; // Convolution backends, windows, spectra
pub mod error;
pub mod kernel; // FIR kernel synthesis
pub mod lanes; // Split, per-lane convolution, carry recombination
pub mod pipeline;
pub mod signal;

pub use error::{FirError, Result};
pub use kernel::{FilterDesign, FilterKernel};
pub use lanes::LaneKernelStrategy;
pub use pipeline::{LanePipeline, PipelineConfig, PipelineReport};
pub use signal::Signal;
