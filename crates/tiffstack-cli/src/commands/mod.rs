pub mod config;
pub mod extract;
pub mod info;
pub mod stats;
pub mod subset;

use std::path::Path;

use anyhow::{Context, Result};
use tiffstack_core::config::ViewerConfig;
use tiffstack_core::io::TiffStack;

fn open_stack(path: &Path, config: &ViewerConfig) -> Result<TiffStack> {
    tracing::debug!("Opening {} with limits {:?}", path.display(), config.limits);
    TiffStack::open_with_limits(path, &config.limits)
        .with_context(|| format!("Failed to open {}", path.display()))
}
