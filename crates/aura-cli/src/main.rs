//! CLI frontend for the Aura affect engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "aura",
    about = "Aura: periodic spatial-affect propagation over scenario maps",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. "warn", "aura_sim=debug")
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the resulting effects
    Run {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "250")]
        ticks: u64,

        /// Show the full event log
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load a scenario and report its passes without running it
    Check {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },

    /// Run a scenario and export a JSON snapshot
    Export {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Number of ticks to simulate before the snapshot
        #[arg(short, long, default_value = "0")]
        ticks: u64,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a random scenario file
    Generate {
        /// Number of entities
        #[arg(short, long, default_value = "40")]
        entities: usize,

        /// RNG seed for deterministic output
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Map width and height
        #[arg(long, default_value = "64")]
        size: i32,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let result = match cli.command {
        Commands::Run {
            scenario,
            ticks,
            verbose,
        } => commands::run::run(&scenario, ticks, verbose),
        Commands::Check { scenario } => commands::check::run(&scenario),
        Commands::Export {
            scenario,
            ticks,
            output,
        } => commands::export::run(&scenario, ticks, output.as_deref()),
        Commands::Generate {
            entities,
            seed,
            size,
            output,
        } => commands::generate::run(entities, seed, size, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
