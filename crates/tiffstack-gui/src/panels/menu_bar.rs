use crate::app::StackApp;

pub fn show(ctx: &egui::Context, app: &mut StackApp) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                let open_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O);
                if ui.add(egui::Button::new("Open...").shortcut_text(ctx.format_shortcut(&open_shortcut))).clicked() {
                    ui.close();
                    app.ui_state.open_requested = true;
                }

                let save_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S);
                let has_stack = app.stack_viewer.has_image_stack();
                if ui
                    .add_enabled(
                        has_stack,
                        egui::Button::new("Save Frame As...").shortcut_text(ctx.format_shortcut(&save_shortcut)),
                    )
                    .clicked()
                {
                    ui.close();
                    app.request_save_frame();
                }

                if ui
                    .add_enabled(has_stack && !app.ui_state.is_busy(), egui::Button::new("Load All Frames"))
                    .clicked()
                {
                    ui.close();
                    app.request_load_all();
                }

                if ui.add_enabled(has_stack, egui::Button::new("Close Stack")).clicked() {
                    ui.close();
                    app.close_stack();
                }

                ui.separator();

                let quit_shortcut = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q);
                if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&quit_shortcut))).clicked() {
                    ui.close();
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Fit to Window").clicked() {
                    ui.close();
                    app.stack_viewer.viewer.reset_view();
                }
                ui.checkbox(&mut app.stack_viewer.viewer.options.can_zoom, "Wheel zoom");
                ui.checkbox(&mut app.stack_viewer.viewer.options.can_pan, "Drag pan");
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    ui.close();
                    app.show_about = true;
                }
            });
        });

        // Keyboard shortcuts (consumed outside menus)
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
            app.ui_state.open_requested = true;
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
            app.request_save_frame();
        }
        if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    });
}
