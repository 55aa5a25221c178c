mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tiffstack_core::config::ViewerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tiffstack", about = "Multi-page TIFF stack tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Viewer configuration file (TOML); only the decode limits apply here
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show TIFF stack metadata
    Info(commands::info::InfoArgs),
    /// Save a single frame as PNG or TIFF
    Extract(commands::extract::ExtractArgs),
    /// Write a range of frames to a new stack
    Subset(commands::subset::SubsetArgs),
    /// Per-frame min/max/mean of a grayscale stack
    Stats(commands::stats::StatsArgs),
    /// Print or save the default viewer configuration
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match cli.config {
        Some(ref path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    match &cli.command {
        Commands::Info(args) => commands::info::run(args, &config),
        Commands::Extract(args) => commands::extract::run(args, &config),
        Commands::Subset(args) => commands::subset::run(args, &config),
        Commands::Stats(args) => commands::stats::run(args, &config),
        Commands::Config(args) => commands::config::run(args),
    }
}
