use std::path::{Path, PathBuf};
use std::sync::mpsc;

use ndarray::Array3;
use tiffstack_core::config::ViewerConfig;
use tiffstack_gui::StackViewer;

use crate::messages::{WorkerCommand, WorkerResult};
use crate::panels;
use crate::state::{LoadAllState, UIState};
use crate::worker;

pub struct StackApp {
    pub cmd_tx: mpsc::Sender<WorkerCommand>,
    pub result_rx: mpsc::Receiver<WorkerResult>,
    pub stack_viewer: StackViewer,
    pub config: ViewerConfig,
    pub ui_state: UIState,
    /// Whole stack as (frames, height, width), once loaded.
    pub all_frames: Option<Array3<f32>>,
    pub show_about: bool,
}

impl StackApp {
    pub fn new(ctx: &egui::Context, config: ViewerConfig, file: Option<PathBuf>) -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        let cmd_tx = worker::spawn_worker(result_tx, ctx.clone());

        let mut app = Self {
            cmd_tx,
            result_rx,
            stack_viewer: StackViewer::new(&config),
            config,
            ui_state: UIState::default(),
            all_frames: None,
            show_about: false,
        };

        match file {
            Some(path) => app.open_stack(Some(&path)),
            None => app.ui_state.open_requested = true,
        }
        app
    }

    /// Load a stack through the widget; a dialog is shown when `path` is `None`.
    pub fn open_stack(&mut self, path: Option<&Path>) {
        match self.stack_viewer.load_image_stack(path) {
            Ok(true) => {
                self.cancel_load_all();
                self.all_frames = None;
                if let Some(info) = self.stack_viewer.stack_info() {
                    let name = info
                        .filename
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    let msg = format!(
                        "Opened: {} ({}x{}, {} frames, {}-bit {})",
                        name,
                        info.width,
                        info.height,
                        info.total_frames,
                        info.bit_depth,
                        info.color_mode
                    );
                    self.ui_state.add_log(msg);
                }
            }
            Ok(false) => {}
            Err(e) => self.ui_state.add_log(format!("ERROR: Failed to open stack: {e}")),
        }
    }

    /// Materialize the whole stack on the worker thread.
    pub fn request_load_all(&mut self) {
        if self.ui_state.is_busy() {
            return;
        }
        let Some(path) = self.current_path() else {
            self.ui_state.add_log("No image stack loaded".into());
            return;
        };

        let state = LoadAllState::new(path.clone());
        self.send_command(WorkerCommand::LoadAllFrames {
            path,
            limits: self.config.limits.clone(),
            cancel: state.cancel.clone(),
        });
        self.ui_state.load_all = Some(state);
    }

    pub fn close_stack(&mut self) {
        self.cancel_load_all();
        self.stack_viewer.clear_image_stack();
        self.all_frames = None;
    }

    /// Stop an in-flight whole-stack read. The run stays busy until the
    /// worker acknowledges.
    fn cancel_load_all(&mut self) {
        if let Some(ref state) = self.ui_state.load_all {
            state.request_cancel();
        }
    }

    /// Ask for an output path, then save the current frame on the worker.
    pub fn request_save_frame(&mut self) {
        let (Some(source), Some(frame_index)) =
            (self.current_path(), self.stack_viewer.current_frame_index())
        else {
            self.ui_state.add_log("No frame to save".into());
            return;
        };

        let cmd_tx = self.cmd_tx.clone();
        std::thread::spawn(move || {
            if let Some(output) = rfd::FileDialog::new()
                .add_filter("TIFF", &["tiff", "tif"])
                .add_filter("PNG", &["png"])
                .set_file_name(format!("frame_{frame_index:04}.tif"))
                .save_file()
            {
                let _ = cmd_tx.send(WorkerCommand::SaveFrame {
                    source,
                    frame_index,
                    output,
                });
            }
        });
    }

    fn current_path(&self) -> Option<PathBuf> {
        self.stack_viewer
            .stack_info()
            .and_then(|info| info.filename.clone())
    }

    /// Drain all pending results from the worker.
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                WorkerResult::Progress {
                    items_done,
                    items_total,
                } => {
                    if let Some(ref mut state) = self.ui_state.load_all {
                        state.items_done = items_done;
                        state.items_total = items_total;
                    }
                }
                WorkerResult::AllFramesLoaded { path, frames, elapsed } => {
                    self.ui_state.load_all = None;
                    if self.current_path().as_deref() != Some(path.as_path()) {
                        self.ui_state
                            .add_log(format!("Discarded frames of {} (stack changed)", path.display()));
                        continue;
                    }
                    let (n, h, w) = frames.dim();
                    let mb = (frames.len() * std::mem::size_of::<f32>()) as f64 / (1024.0 * 1024.0);
                    self.ui_state.add_log(format!(
                        "Loaded entire stack: ({n}, {h}, {w}), {mb:.1} MB in {}",
                        format_duration(elapsed)
                    ));
                    self.all_frames = Some(frames);
                }
                WorkerResult::Cancelled => {
                    self.ui_state.load_all = None;
                    self.ui_state.add_log("Stack loading cancelled".into());
                }
                WorkerResult::FrameSaved { path } => {
                    self.ui_state.add_log(format!("Saved: {}", path.display()));
                }
                WorkerResult::Error { message } => {
                    self.ui_state.load_all = None;
                    self.ui_state.add_log(format!("ERROR: {message}"));
                }
            }
        }
    }

    pub fn send_command(&self, cmd: WorkerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }
}

impl eframe::App for StackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();

        if std::mem::take(&mut self.ui_state.open_requested) {
            self.open_stack(None);
        }

        panels::menu_bar::show(ctx, self);
        panels::status::show(ctx, self);
        panels::viewport::show(ctx, self);

        if self.show_about {
            egui::Window::new("About TIFF Stack Viewer")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("TIFF Stack Viewer");
                        ui.label("Multi-page TIFF browser with zoom and pan");
                        ui.add_space(8.0);
                        ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                        ui.add_space(8.0);
                        if ui.button("Close").clicked() {
                            self.show_about = false;
                        }
                    });
                });
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        let mins = secs / 60.0;
        format!("{mins:.1}min")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use ndarray::Array2;
    use tiffstack_core::frame::{Frame, SampleKind, StackFrame};
    use tiffstack_core::io::image_io::write_stack;

    use super::*;

    fn write_fixture(path: &Path, frames: usize) {
        let pages: Vec<StackFrame> = (0..frames)
            .map(|k| {
                let data = Array2::from_shape_fn((4, 6), |(r, c)| (k * 24 + r * 6 + c) as f32);
                StackFrame::Mono(Frame::new(data, 16, SampleKind::Unsigned))
            })
            .collect();
        write_stack(path, &pages).unwrap();
    }

    /// App showing `a.tif` with a whole-stack read of it in flight.
    /// Worker results are fed through the returned sender.
    fn app_loading_all(dir: &Path) -> (StackApp, PathBuf, mpsc::Sender<WorkerResult>) {
        let a = dir.join("a.tif");
        write_fixture(&a, 3);

        let ctx = egui::Context::default();
        let mut app = StackApp::new(&ctx, ViewerConfig::default(), Some(a.clone()));
        let (tx, rx) = mpsc::channel();
        app.result_rx = rx;
        app.ui_state.load_all = Some(LoadAllState::new(a.clone()));
        (app, a, tx)
    }

    fn loaded(path: &Path, frames: usize) -> WorkerResult {
        WorkerResult::AllFramesLoaded {
            path: path.to_path_buf(),
            frames: Array3::zeros((frames, 4, 6)),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_loaded_frames_for_current_stack_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, a, tx) = app_loading_all(dir.path());

        tx.send(loaded(&a, 3)).unwrap();
        app.poll_results();

        assert!(!app.ui_state.is_busy());
        assert_eq!(app.all_frames.as_ref().map(|f| f.dim()), Some((3, 4, 6)));
    }

    #[test]
    fn test_opening_another_stack_cancels_and_drops_stale_frames() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, a, tx) = app_loading_all(dir.path());
        let cancel = app.ui_state.load_all.as_ref().unwrap().cancel.clone();

        let b = dir.path().join("b.tif");
        write_fixture(&b, 2);
        app.open_stack(Some(&b));
        assert!(cancel.load(Ordering::Relaxed));

        tx.send(loaded(&a, 3)).unwrap();
        app.poll_results();
        assert!(app.all_frames.is_none());
        assert!(!app.ui_state.is_busy());
        assert_eq!(app.stack_viewer.num_frames(), 2);
    }

    #[test]
    fn test_closing_stack_cancels_load() {
        let dir = tempfile::tempdir().unwrap();
        let (mut app, a, tx) = app_loading_all(dir.path());
        let cancel = app.ui_state.load_all.as_ref().unwrap().cancel.clone();

        app.close_stack();
        assert!(cancel.load(Ordering::Relaxed));
        assert!(!app.stack_viewer.has_image_stack());

        tx.send(loaded(&a, 3)).unwrap();
        app.poll_results();
        assert!(app.all_frames.is_none());
    }
}
