use tracing::trace;

use super::convolve::LaneConvOutput;
use crate::error::{FirError, Result};

/*
Carry Recombination
===================

The lane convolutions y_0 .. y_{N-1} each have C = laneLen + laneKernelLen - 1
samples. The full-rate output is rebuilt one macro-step m at a time, N samples
per step, with one running value (the carry) handed from lane to lane and from
step to step.

    m = 0           RAMP_UP     carry += y_p[0]
    0 < m < C       STEADY      carry += y_p[m] - y_p[m-1]
    m = C           RAMP_DOWN   carry -= y_p[m-1]

    output[N*m + p] = carry     (after lane p's update)

Lane p swapping its old sample for its new one is what makes the carry work.
After lane p's update in step m the carry holds

    y_0[m] + ... + y_p[m]  +  y_{p+1}[m-1] + ... + y_{N-1}[m-1]

Lanes at or before p have moved to step m; the later lanes are still at m - 1.
In RAMP_UP nothing is "still at m - 1" yet, and in RAMP_DOWN there is nothing
at m any more, so each lane only adds or only removes.

    step:        0         1         2     ...     C
               RAMP_UP   STEADY    STEADY        RAMP_DOWN
    lane 0     +y0[0]    +y0[1]    +y0[2]         -y0[C-1]
                         -y0[0]    -y0[1]
    lane 1     +y1[0]    +y1[1]    ...            -y1[C-1]
                         -y1[0]
    ...

The machine emits N * (C + 1) samples. Only the first
originalLen + N * laneKernelLen - 1 can be non-zero; the rest come from
padding and are dropped.

Every step depends on the previous carry, so this part runs sequentially.
*/

/// Which of the three recombination regimes a macro-step is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RampUp,
    Steady,
    RampDown,
}

impl Phase {
    /// Phase of macro-step `step` for lane outputs of length `conv_len`, or
    /// `None` once the machine has run out of steps.
    pub fn at(step: usize, conv_len: usize) -> Option<Phase> {
        match step {
            0 => Some(Phase::RampUp),
            s if s < conv_len => Some(Phase::Steady),
            s if s == conv_len => Some(Phase::RampDown),
            _ => None,
        }
    }
}

/// The carry state machine over one set of lane outputs.
#[derive(Debug, Clone)]
pub struct Recombiner<'a> {
    lanes: &'a [Vec<f64>],
    conv_len: usize,
    carry: f64,
    macro_step: usize,
    last_phase: Option<Phase>,
    output: Vec<f64>,
}

impl<'a> Recombiner<'a> {
    /// All lane outputs must be non-empty and equally long.
    pub fn new(lanes: &'a [Vec<f64>]) -> Result<Self> {
        let conv_len = match lanes.first() {
            None => return Err(FirError::ZeroLanes),
            Some(first) if first.is_empty() => {
                return Err(FirError::empty("lane convolution output"))
            }
            Some(first) => first.len(),
        };
        if let Some(ragged) = lanes.iter().find(|lane| lane.len() != conv_len) {
            return Err(FirError::LaneKernelMismatch {
                expected: conv_len,
                actual: ragged.len(),
            });
        }

        Ok(Self {
            lanes,
            conv_len,
            carry: 0.0,
            macro_step: 0,
            last_phase: None,
            output: Vec::with_capacity(lanes.len() * (conv_len + 1)),
        })
    }

    /// Phase of the next macro-step, `None` when finished.
    pub fn phase(&self) -> Option<Phase> {
        Phase::at(self.macro_step, self.conv_len)
    }

    pub fn carry(&self) -> f64 {
        self.carry
    }

    /// Samples emitted so far.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Run one macro-step, emitting N samples. Returns the phase it ran in.
    pub fn advance(&mut self) -> Option<Phase> {
        let phase = self.phase()?;
        let m = self.macro_step;

        if self.last_phase != Some(phase) {
            trace!(step = m, ?phase, carry = self.carry, "recombiner phase");
            self.last_phase = Some(phase);
        }

        for lane in self.lanes {
            self.carry = match phase {
                Phase::RampUp => self.carry + lane[0],
                Phase::Steady => self.carry - lane[m - 1] + lane[m],
                Phase::RampDown => self.carry - lane[m - 1],
            };
            self.output.push(self.carry);
        }

        self.macro_step += 1;
        Some(phase)
    }

    /// Run the remaining steps and keep the first `output_len` samples.
    pub fn finish(mut self, output_len: usize) -> Vec<f64> {
        while self.advance().is_some() {}
        self.output.truncate(output_len);
        self.output
    }
}

/// Rebuild the full-rate convolution from lane outputs.
pub fn recombine(output: &LaneConvOutput) -> Result<Vec<f64>> {
    let recombiner = Recombiner::new(output.lanes())?;
    Ok(recombiner.finish(output.reconstructed_len()))
}
