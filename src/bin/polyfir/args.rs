//! polyfir CLI arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use polyfir::LaneKernelStrategy;

/// Built-in pipeline runs.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Scenario {
    /// 100 Hz sine, one period at 3200 Hz, through a 32-tap moving average
    MovingAverage,
    /// 80 MHz sine at 2457.6 MHz through a 249-tap band-pass (80 MHz +- 25 MHz)
    BandPass,
}

/// How lane kernels are derived.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Strategy {
    /// Every Nth coefficient of the full kernel
    Decimate,
    /// Re-synthesize the design at 1/N of the sample rate
    Resynthesize,
}

impl From<Strategy> for LaneKernelStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Decimate => LaneKernelStrategy::Decimate,
            Strategy::Resynthesize => LaneKernelStrategy::Resynthesize,
        }
    }
}

/// polyfir CLI arguments.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Number of parallel lanes
    #[clap(long, default_value_t = 4)]
    pub lanes: usize,
    /// Lane kernel strategy
    #[clap(long, value_enum, default_value_t = Strategy::Decimate)]
    pub strategy: Strategy,
    /// Built-in scenario to run
    #[clap(long, value_enum, default_value_t = Scenario::MovingAverage)]
    pub scenario: Scenario,
    /// JSON pipeline configuration (overrides the scenario and the flags above)
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Use the 16-bit fixed-point convolution backend
    #[clap(long)]
    pub fixed_point: bool,
    /// Print the resolved configuration as JSON and exit
    #[clap(long)]
    pub dump_config: bool,
}
