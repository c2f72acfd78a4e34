//! polyfir - N-lane FIR reconstruction check
//!
//! Run with: cargo run -- --lanes 4 --scenario band-pass

mod app;
mod args;

use app::App;
use args::Args;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    App::new(&Args::parse())?.run()
}
