use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::fs::File;
use std::io;
use std::path::PathBuf;

use flexgrid_sim::domain::simulator::simulator::SimulatorOptions;
use flexgrid_sim::domain::statistics::statistics::write_summaries_csv;
use flexgrid_sim::{logger, run_simulation};

/// Discrete event simulator for admission control in elastic optical networks.
#[derive(Debug, Parser)]
#[command(name = "flexgrid-sim", version, about)]
struct Args {
    /// Simulation configuration (JSON).
    #[arg(short, long)]
    config: PathBuf,

    /// Number of independent runs, seeded 1..=n.
    #[arg(short, long, default_value_t = 1)]
    seeds: u64,

    /// Offered load in Erlang, overrides traffic.load when greater than zero.
    #[arg(short, long, default_value_t = 0.0)]
    load: f64,

    /// Write a trace file per seed.
    #[arg(short, long)]
    trace: bool,

    /// Write the per-seed summaries to this CSV file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(if args.verbose { Some(LevelFilter::Debug) } else { None });

    let options = SimulatorOptions { seeds: args.seeds, forced_load: (args.load > 0.0).then_some(args.load), trace: args.trace };

    let summaries = run_simulation(&args.config, options).with_context(|| format!("Simulation '{}' failed", args.config.display()))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Cannot create '{}'", path.display()))?;
            write_summaries_csv(file, &summaries)?;
            log::info!("Statistics written to '{}'.", path.display());
        }
        None => write_summaries_csv(io::stdout().lock(), &summaries)?,
    }

    Ok(())
}
