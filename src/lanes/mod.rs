//! N-lane (polyphase) decomposition of a full-rate convolution.
//!
//! A full-rate stream is split into N interleaved lanes, each lane is convolved
//! at 1/N of the rate against a short lane kernel, and the lane outputs are
//! stitched back into one full-rate sequence by a carry state machine.
//!
//! ```text
//!              +--> lane 0 --> [ * g_0 ] --+
//!   signal --->+--> lane 1 --> [ * g_1 ] --+--> recombine --> output
//!   (split)    +--> ...                    |    (carry)
//!              +--> lane N-1 -> [ * g ] ---+
//! ```

/// Per-lane convolution, optionally parallel.
pub mod convolve;
/// Lane kernel sets and their full-rate equivalent.
pub mod kernels;
/// The three-phase carry recombiner.
pub mod recombine;
/// Interleaved lane decomposition.
pub mod split;

pub use convolve::{LaneConvOutput, LaneConvolver};
pub use kernels::{hold, LaneKernelSet, LaneKernelStrategy};
pub use recombine::{recombine, Phase, Recombiner};
pub use split::LaneSet;
