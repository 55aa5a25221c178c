use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use tiffstack_core::progress::ProgressReporter;

use crate::messages::WorkerResult;

/// Progress reporter that sends updates over an mpsc channel to the UI thread
/// and watches a shared cancel flag.
pub struct ChannelProgressReporter {
    tx: mpsc::Sender<WorkerResult>,
    ctx: egui::Context,
    cancel: Arc<AtomicBool>,
    current_total: AtomicUsize,
}

impl ChannelProgressReporter {
    pub fn new(tx: mpsc::Sender<WorkerResult>, ctx: egui::Context, cancel: Arc<AtomicBool>) -> Self {
        Self {
            tx,
            ctx,
            cancel,
            current_total: AtomicUsize::new(0),
        }
    }
}

impl ProgressReporter for ChannelProgressReporter {
    fn begin(&self, total_items: usize) {
        self.current_total.store(total_items, Ordering::Relaxed);
        let _ = self.tx.send(WorkerResult::Progress {
            items_done: 0,
            items_total: total_items,
        });
        self.ctx.request_repaint();
    }

    fn advance(&self, items_done: usize) {
        let _ = self.tx.send(WorkerResult::Progress {
            items_done,
            items_total: self.current_total.load(Ordering::Relaxed),
        });
        self.ctx.request_repaint();
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }
}
