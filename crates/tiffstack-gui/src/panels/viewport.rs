use crate::app::StackApp;

pub fn show(ctx: &egui::Context, app: &mut StackApp) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let response = app.stack_viewer.ui(ui);

            app.ui_state.hover_pos = response.viewer.hover_pos;

            if let Some(click) = response.viewer.clicked {
                app.ui_state.add_log(format!(
                    "Clicked {:?} at ({:.0}, {:.0})",
                    click.button,
                    click.pos.x.floor(),
                    click.pos.y.floor()
                ));
            }

            if let Some(error) = response.error {
                app.ui_state.add_log(format!("ERROR: {error}"));
            }
        });
}
