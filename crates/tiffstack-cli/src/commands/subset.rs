use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tiffstack_core::config::ViewerConfig;
use tiffstack_core::io::image_io::write_stack;

#[derive(Args)]
pub struct SubsetArgs {
    /// Input TIFF stack
    pub file: PathBuf,

    /// First frame to keep (zero-based)
    #[arg(long, default_value = "0")]
    pub start: usize,

    /// Last frame to keep, inclusive; defaults to the final frame
    #[arg(long)]
    pub end: Option<usize>,

    /// Output TIFF stack
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run(args: &SubsetArgs, config: &ViewerConfig) -> Result<()> {
    let mut stack = super::open_stack(&args.file, config)?;
    let total = stack.frame_count();
    let end = args.end.unwrap_or(total.saturating_sub(1));
    if args.start > end || end >= total {
        bail!(
            "Invalid frame range {}..={} for a stack of {} frames",
            args.start,
            end,
            total
        );
    }

    let pb = ProgressBar::new((end - args.start + 1) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Reading frames");

    let mut frames = Vec::with_capacity(end - args.start + 1);
    for index in args.start..=end {
        frames.push(stack.read_frame(index)?);
        pb.inc(1);
    }
    pb.finish_with_message("Writing stack");

    write_stack(&args.output, &frames)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!(
        "Frames {}..={} ({} total) saved to {}",
        args.start,
        end,
        frames.len(),
        args.output.display()
    );

    Ok(())
}
