use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;
use tiffstack_core::config::ViewerConfig;

#[derive(Args)]
pub struct InfoArgs {
    /// Input TIFF stack
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs, config: &ViewerConfig) -> Result<()> {
    let stack = super::open_stack(&args.file, config)?;
    let info = stack.info();

    let label = Style::new().dim();
    let value = Style::new().bold();

    let rows = [
        ("File", args.file.display().to_string()),
        ("Frames", info.total_frames.to_string()),
        ("Dimensions", format!("{}x{}", info.width, info.height)),
        ("Bit depth", info.bit_depth.to_string()),
        ("Color mode", info.color_mode.to_string()),
        (
            "Data size",
            format!("{:.1} MB", stack.estimated_bytes() as f64 / (1024.0 * 1024.0)),
        ),
    ];
    for (name, text) in rows {
        println!("{:<13}{}", label.apply_to(format!("{name}:")), value.apply_to(text));
    }

    Ok(())
}
