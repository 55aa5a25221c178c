mod app;
mod messages;
mod panels;
mod progress;
mod state;
mod worker;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tiffstack_core::config::ViewerConfig;

#[derive(Parser)]
#[command(name = "tiffstack-gui", about = "Multi-page TIFF stack viewer")]
#[command(version)]
struct Cli {
    /// TIFF stack to open; a file dialog is shown when omitted
    file: Option<PathBuf>,

    /// Viewer configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title("TIFF Stack Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "TiffStackViewer",
        options,
        Box::new(move |cc| Ok(Box::new(app::StackApp::new(&cc.egui_ctx, config, cli.file)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
