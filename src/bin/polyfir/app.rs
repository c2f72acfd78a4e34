//! polyfir - scenario runner and report printer

use std::fs;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use polyfir::{
    kernel::{FixedLengthBandPass, KernelDiagnostics, MovingAverage},
    pipeline::{Backend, SineConfig, DEFAULT_TOLERANCE},
    PipelineConfig, PipelineReport,
};
use tracing::info;

use super::args::{Args, Scenario};

pub struct App {
    config: PipelineConfig,
    dump_config: bool,
}

impl App {
    pub fn new(args: &Args) -> EyreResult<Self> {
        let config: PipelineConfig = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .wrap_err_with(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&text)
                    .wrap_err_with(|| format!("invalid pipeline configuration in {}", path.display()))?
            }
            None => scenario(args),
        };
        Ok(Self {
            config,
            dump_config: args.dump_config,
        })
    }

    pub fn run(self) -> EyreResult<()> {
        if self.dump_config {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
            return Ok(());
        }

        info!(lanes = self.config.lanes, backend = ?self.config.backend, "running pipeline");
        let report = self.config.run().wrap_err("pipeline run failed")?;
        print_report(&report);
        report
            .verify()
            .wrap_err("reconstruction does not match the reference")
    }
}

fn scenario(args: &Args) -> PipelineConfig {
    let (signal, design) = match args.scenario {
        Scenario::MovingAverage => (
            SineConfig {
                frequency_hz: 100.0,
                sample_rate: 3_200.0,
                samples: 32,
            },
            MovingAverage::with_length(32, 3_200.0).into(),
        ),
        Scenario::BandPass => (
            SineConfig {
                frequency_hz: 80e6,
                sample_rate: 2_457.6e6,
                samples: 1_024,
            },
            FixedLengthBandPass::new(80e6, 50e6, 249, 2_457.6e6).into(),
        ),
    };
    PipelineConfig {
        lanes: args.lanes,
        strategy: args.strategy.into(),
        backend: if args.fixed_point {
            Backend::FixedPoint { sample_bits: 16 }
        } else {
            Backend::Direct
        },
        tolerance: DEFAULT_TOLERANCE,
        signal,
        design,
    }
}

fn print_report(report: &PipelineReport) {
    print_diagnostics(report.kernel.diagnostics());

    println!();
    println!("lanes              {}", report.lanes);
    println!("strategy           {:?}", report.strategy);
    println!("lane kernel taps   {}", report.lane_kernels.kernel_len());
    println!("output samples     {}", report.reconstructed.len());
    println!("direct samples     {}", report.full_direct.len());
    println!("max error          {:.3e}", report.max_error);
    println!("divergence         {:.3e}", report.divergence);
}

fn print_diagnostics(diag: &KernelDiagnostics) {
    println!("kernel             {:?}", diag.kind);
    println!("taps               {}", diag.taps);
    println!("M_k                {}", diag.m_k);
    if let Some(m_b) = diag.m_b {
        println!("M_b                {m_b}");
    }
    let optional = [
        ("f_ch", diag.f_ch),
        ("f_cl", diag.f_cl),
        ("Nh", diag.nh),
        ("Nl", diag.nl),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            println!("{name:<19}{value:.6e}");
        }
    }
    println!("sample rate        {:.6e} Hz", diag.sample_rate);
    if diag.trimmed {
        println!("trimmed            one tap from each end");
    }
}
