use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use tiffstack_core::error::StackError;
use tiffstack_core::io::image_io::save_frame;
use tiffstack_core::io::TiffStack;

use crate::messages::{WorkerCommand, WorkerResult};
use crate::progress::ChannelProgressReporter;

/// Spawn the background worker thread. Returns the command sender.
pub fn spawn_worker(tx: mpsc::Sender<WorkerResult>, ctx: egui::Context) -> mpsc::Sender<WorkerCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerCommand>();

    std::thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                WorkerCommand::LoadAllFrames { path, limits, cancel } => {
                    let reporter = ChannelProgressReporter::new(tx.clone(), ctx.clone(), cancel);
                    let start = Instant::now();
                    let result = TiffStack::open_with_limits(&path, &limits)
                        .and_then(|mut stack| stack.all_frames_reported(&reporter));
                    match result {
                        Ok(frames) => send(&tx, &ctx, WorkerResult::AllFramesLoaded {
                            path,
                            frames,
                            elapsed: start.elapsed(),
                        }),
                        Err(StackError::Cancelled) => send(&tx, &ctx, WorkerResult::Cancelled),
                        Err(e) => send_error(&tx, &ctx, format!("Failed to load stack: {e}")),
                    }
                }
                WorkerCommand::SaveFrame { source, frame_index, output } => {
                    match save_stack_frame(&source, frame_index, &output) {
                        Ok(()) => send(&tx, &ctx, WorkerResult::FrameSaved { path: output }),
                        Err(e) => send_error(&tx, &ctx, format!("Failed to save frame: {e}")),
                    }
                }
            }
        }
    });

    cmd_tx
}

fn save_stack_frame(source: &Path, frame_index: usize, output: &Path) -> tiffstack_core::error::Result<()> {
    let frame = TiffStack::open(source)?.read_frame(frame_index)?;
    save_frame(&frame, output)
}

fn send(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, result: WorkerResult) {
    let _ = tx.send(result);
    ctx.request_repaint();
}

fn send_error(tx: &mpsc::Sender<WorkerResult>, ctx: &egui::Context, message: String) {
    tracing::error!("{message}");
    send(tx, ctx, WorkerResult::Error { message });
}
