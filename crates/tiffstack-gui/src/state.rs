use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State of an in-flight "load all frames" run.
pub struct LoadAllState {
    /// Stack being read; results for any other path are stale.
    pub path: PathBuf,
    pub cancel: Arc<AtomicBool>,
    pub items_done: usize,
    pub items_total: usize,
}

impl LoadAllState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cancel: Arc::new(AtomicBool::new(false)),
            items_done: 0,
            items_total: 0,
        }
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn fraction(&self) -> f32 {
        if self.items_total == 0 {
            0.0
        } else {
            self.items_done as f32 / self.items_total as f32
        }
    }
}

/// Overall UI state.
#[derive(Default)]
pub struct UIState {
    /// Log messages.
    pub log_messages: Vec<String>,

    /// Set while the worker is materializing the whole stack.
    pub load_all: Option<LoadAllState>,

    pub hover_pos: Option<egui::Pos2>,

    /// Show the open dialog on the next frame.
    pub open_requested: bool,
}

impl UIState {
    pub fn is_busy(&self) -> bool {
        self.load_all.is_some()
    }

    pub fn add_log(&mut self, msg: String) {
        tracing::info!("{msg}");
        self.log_messages.push(msg);
    }
}
