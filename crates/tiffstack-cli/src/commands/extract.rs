use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tiffstack_core::config::ViewerConfig;
use tiffstack_core::io::image_io::save_frame;

#[derive(Args)]
pub struct ExtractArgs {
    /// Input TIFF stack
    pub file: PathBuf,

    /// Zero-based frame index
    #[arg(long, default_value = "0")]
    pub frame: usize,

    /// Output image: .png for an 8-bit preview, .tif/.tiff for raw values
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: &ExtractArgs, config: &ViewerConfig) -> Result<()> {
    let mut stack = super::open_stack(&args.file, config)?;
    let frame = stack.read_frame(args.frame)?;

    save_frame(&frame, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Frame {} ({}x{}) saved to {}",
        args.frame,
        frame.width(),
        frame.height(),
        args.output.display()
    );

    Ok(())
}
