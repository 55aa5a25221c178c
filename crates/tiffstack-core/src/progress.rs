/// Progress reporting for long-running stack operations.
///
/// Implementors can drive progress bars or dialogs. All methods have default
/// no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Work has started on `total_items` frames.
    fn begin(&self, _total_items: usize) {}

    /// `items_done` frames are finished.
    fn advance(&self, _items_done: usize) {}

    /// All work is finished.
    fn finish(&self) {}

    /// Polled between frames; returning true aborts the operation.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Reporter that ignores everything.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
