use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tiffstack_core::config::ViewerConfig;
use tiffstack_core::progress::ProgressReporter;
use tiffstack_core::stats::frame_statistics;

#[derive(Args)]
pub struct StatsArgs {
    /// Input TIFF stack (grayscale)
    pub file: PathBuf,
}

/// Drives an indicatif bar from the core's progress callbacks.
struct BarReporter(ProgressBar);

impl ProgressReporter for BarReporter {
    fn begin(&self, total_items: usize) {
        self.0.set_length(total_items as u64);
        self.0.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.0.set_position(items_done as u64);
    }

    fn finish(&self) {
        self.0.finish_with_message("Computing statistics");
    }
}

pub fn run(args: &StatsArgs, config: &ViewerConfig) -> Result<()> {
    let mut stack = super::open_stack(&args.file, config)?;

    let pb = ProgressBar::new(stack.frame_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.set_message("Reading frames");

    let frames = stack.all_frames_reported(&BarReporter(pb))?;
    let (n, h, w) = frames.dim();
    let stats = frame_statistics(&frames);

    println!("\nStack shape: ({n}, {h}, {w})");
    println!("{:>7}  {:>12}  {:>12}  {:>12}", "Frame", "Min", "Max", "Mean");
    println!("{}", "-".repeat(49));
    for s in &stats {
        println!(
            "{:>7}  {:>12.3}  {:>12.3}  {:>12.3}",
            s.frame_index, s.min, s.max, s.mean
        );
    }

    Ok(())
}
