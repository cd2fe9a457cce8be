//! `fur`: generate and preview shell fur from the command line.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "fur")]
#[command(version, about = "Shell fur generation and sway preview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Options shared by commands that build a rig.
#[derive(clap::Args, Debug, Clone)]
pub struct RigArgs {
    /// Rig config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override shell height
    #[arg(long)]
    height: Option<f64>,

    /// Override shell count
    #[arg(long)]
    count: Option<f64>,

    /// Only grow fur on these surface indices (comma separated)
    #[arg(long, value_delimiter = ',')]
    surfaces: Vec<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-surface statistics and extrusion readiness
    Info {
        /// Input mesh (OBJ or STL)
        input: PathBuf,
    },

    /// Generate shell layers and optionally write them out
    Generate {
        /// Input mesh (OBJ or STL)
        input: PathBuf,

        #[command(flatten)]
        rig: RigArgs,

        /// Directory to write one OBJ per layer into
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the effective config as TOML and exit
        #[arg(long)]
        dump_config: bool,
    },

    /// Move the mesh at constant velocity and report layer offsets
    Simulate {
        /// Input mesh (OBJ or STL)
        input: PathBuf,

        #[command(flatten)]
        rig: RigArgs,

        /// Number of ticks to run
        #[arg(long, default_value_t = 60)]
        ticks: usize,

        /// Seconds per tick
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f64,

        /// World-space velocity of the mesh as x,y,z
        #[arg(
            long,
            value_delimiter = ',',
            allow_hyphen_values = true,
            default_values_t = [1.0, 0.0, 0.0]
        )]
        velocity: Vec<f64>,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Info { input } => commands::info::run(&input, cli.format, cli.quiet),
        Commands::Generate {
            input,
            rig,
            out,
            dump_config,
        } => commands::generate::run(
            &input,
            &rig,
            out.as_deref(),
            dump_config,
            cli.format,
            cli.quiet,
        ),
        Commands::Simulate {
            input,
            rig,
            ticks,
            dt,
            velocity,
        } => commands::simulate::run(
            &input,
            &rig,
            ticks,
            dt,
            &velocity,
            cli.format,
            cli.quiet,
        ),
    }
}
