use crate::{
    error::{FirError, Result},
    kernel::ensure_lanes,
    signal::Signal,
};

/*
Lane Split
==========

    index:   0  1  2  3  4  5  6  7  8  9
    lane 0:  x0          x4          x8
    lane 1:     x1          x5          x9
    lane 2:        x2          x6          0   <- padding
    lane 3:           x3          x7       0   <- padding

Lane p takes every sample whose index is p mod N, in order. Every lane ends up
ceil(len / N) long; the lanes that run out early are padded with zeros.
*/

/// A signal decomposed into N interleaved lower-rate lanes.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneSet {
    lanes: Vec<Vec<f64>>,
    original_len: usize,
    lane_rate: f64,
}

impl LaneSet {
    pub fn split(signal: &Signal, lanes: usize) -> Result<Self> {
        Self::split_samples(signal.samples(), signal.sample_rate(), lanes)
    }

    /// Split raw samples taken at `sample_rate`.
    pub fn split_samples(samples: &[f64], sample_rate: f64, lanes: usize) -> Result<Self> {
        let n = ensure_lanes(lanes)?;
        if samples.is_empty() {
            return Err(FirError::empty("lane split input"));
        }

        let lane_len = samples.len().div_ceil(n);
        let mut split = vec![Vec::with_capacity(lane_len); n];
        for (i, &x) in samples.iter().enumerate() {
            split[i % n].push(x);
        }
        for lane in split.iter_mut() {
            lane.resize(lane_len, 0.0);
        }

        Ok(Self {
            lanes: split,
            original_len: samples.len(),
            lane_rate: sample_rate / n as f64,
        })
    }

    pub fn lanes(&self) -> &[Vec<f64>] {
        &self.lanes
    }

    pub fn lane(&self, p: usize) -> &[f64] {
        &self.lanes[p]
    }

    /// Number of lanes N.
    pub fn count(&self) -> usize {
        self.lanes.len()
    }

    /// Samples per lane, padding included.
    pub fn lane_len(&self) -> usize {
        self.lanes.first().map_or(0, Vec::len)
    }

    /// Length of the signal before splitting.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Zeros appended across all lanes.
    pub fn padding(&self) -> usize {
        self.count() * self.lane_len() - self.original_len
    }

    /// Sample rate of each lane: the input rate over N.
    pub fn lane_rate(&self) -> f64 {
        self.lane_rate
    }

    /// Re-interleave the lanes into the original sample order, dropping padding.
    pub fn interleave(&self) -> Vec<f64> {
        let n = self.count();
        (0..self.original_len)
            .map(|i| self.lanes[i % n][i / n])
            .collect()
    }
}
