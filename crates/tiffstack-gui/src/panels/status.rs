use crate::app::StackApp;

pub fn show(ctx: &egui::Context, app: &mut StackApp) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.add_space(2.0);

        let mut cancel_clicked = false;
        if let Some(ref state) = app.ui_state.load_all {
            ui.horizontal(|ui| {
                let detail = if state.items_total > 0 {
                    format!("Loading frames ({}/{})", state.items_done, state.items_total)
                } else {
                    "Loading frames...".to_string()
                };
                let width = ui.available_width() - 80.0;
                ui.add(
                    egui::ProgressBar::new(state.fraction())
                        .text(detail)
                        .desired_width(width.max(50.0))
                        .animate(true),
                );
                cancel_clicked = ui.button("Cancel").clicked();
            });
        } else {
            ui.add(egui::ProgressBar::new(0.0).text(""));
        }
        if cancel_clicked {
            if let Some(ref state) = app.ui_state.load_all {
                state.request_cancel();
            }
        }

        // Log area, fixed at 4 lines.
        let line_height = ui.text_style_height(&egui::TextStyle::Body);
        let spacing = ui.spacing().item_spacing.y;
        let log_height = line_height * 4.0 + spacing * 3.0;

        egui::ScrollArea::vertical()
            .max_height(log_height)
            .min_scrolled_height(log_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if app.ui_state.log_messages.is_empty() {
                    for _ in 0..4 {
                        ui.label("");
                    }
                } else {
                    for msg in &app.ui_state.log_messages {
                        ui.label(msg);
                    }
                }
            });

        ui.horizontal(|ui| {
            let viewer = &app.stack_viewer.viewer;
            if let Some(size) = viewer.image_size() {
                ui.label(format!("{}x{}", size[0], size[1]));
                ui.separator();
            }
            ui.label(format!("Zoom: {:.0}%", viewer.zoom * 100.0));

            if let Some(index) = app.stack_viewer.current_frame_index() {
                ui.separator();
                ui.label(format!("Frame {}/{}", index + 1, app.stack_viewer.num_frames()));
            }
            if let Some(pos) = app.ui_state.hover_pos {
                ui.separator();
                ui.label(format!("({:.0}, {:.0})", pos.x.floor(), pos.y.floor()));
            }
            if let Some((n, h, w)) = app.all_frames.as_ref().map(|frames| frames.dim()) {
                ui.separator();
                ui.label(format!("In memory: ({n}, {h}, {w})"));
            }
        });

        ui.add_space(2.0);
    });
}
