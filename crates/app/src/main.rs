use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use junction::config::ControllerConfig;

mod driver;

#[derive(Parser, Debug)]
#[command(
    name = "greenwave",
    about = "Priority-driven traffic light controller for a single intersection"
)]
struct Cli {
    /// JSON controller configuration (defaults are used when absent).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of cycles to run.
    #[arg(long, conflicts_with = "until_exhausted")]
    cycles: Option<u64>,

    /// Seconds to wait between cycles.
    #[arg(long)]
    delay: Option<f64>,

    /// Recorded measurement trace to replay as the traffic feed.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Seed for synthetic lane readings.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep cycling until the feed runs out or the process is interrupted.
    #[arg(long)]
    until_exhausted: bool,
}

impl Cli {
    /// Command-line flags win over the file.
    fn apply(&self, config: &mut ControllerConfig) {
        if let Some(cycles) = self.cycles {
            config.cycles = Some(cycles);
        }
        if self.until_exhausted {
            config.cycles = None;
        }
        if let Some(delay) = self.delay {
            config.cycle_delay_secs = delay;
        }
        if let Some(trace) = &self.trace {
            config.trace = Some(trace.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ControllerConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Config error ({}): {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ControllerConfig::default(),
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("Config error: {e}");
        return ExitCode::FAILURE;
    }

    driver::run(config)
}
