use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use ndarray::Array3;
use tiffstack_core::config::DecodeLimits;

/// Commands sent from UI thread to worker thread.
pub enum WorkerCommand {
    /// Decode every frame of a grayscale stack into one array.
    LoadAllFrames {
        path: PathBuf,
        limits: DecodeLimits,
        cancel: Arc<AtomicBool>,
    },

    /// Save one frame of a stack to disk.
    SaveFrame {
        source: PathBuf,
        frame_index: usize,
        output: PathBuf,
    },
}

/// Results sent from worker thread back to UI thread.
pub enum WorkerResult {
    Progress {
        items_done: usize,
        items_total: usize,
    },
    AllFramesLoaded {
        path: PathBuf,
        frames: Array3<f32>,
        elapsed: Duration,
    },
    Cancelled,
    FrameSaved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}
