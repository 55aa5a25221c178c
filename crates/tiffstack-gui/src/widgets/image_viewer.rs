use std::sync::Arc;

use tiffstack_core::config::ViewerOptions;

/// A mouse click on the displayed image, in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageClick {
    pub button: egui::PointerButton,
    pub pos: egui::Pos2,
}

pub struct ImageViewerResponse {
    pub response: egui::Response,
    pub clicked: Option<ImageClick>,
    pub double_clicked: bool,
    /// Pointer position over the image, in image pixel coordinates.
    pub hover_pos: Option<egui::Pos2>,
}

/// Displays a single image with wheel zoom, drag pan and click reporting.
///
/// Replacing the image keeps the current zoom and pan.
pub struct ImageViewer {
    pub options: ViewerOptions,
    pub zoom: f32,
    pub pan_offset: egui::Vec2,
    image: Option<Arc<egui::ColorImage>>,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
    fit_pending: bool,
}

impl ImageViewer {
    pub fn new(options: ViewerOptions) -> Self {
        let fit_pending = options.fit_on_load;
        Self {
            options,
            zoom: 1.0,
            pan_offset: egui::Vec2::ZERO,
            image: None,
            texture: None,
            texture_dirty: false,
            fit_pending,
        }
    }

    pub fn set_image(&mut self, image: egui::ColorImage) {
        self.image = Some(Arc::new(image));
        self.texture_dirty = true;
    }

    pub fn clear_image(&mut self) {
        self.image = None;
        self.texture = None;
        self.texture_dirty = false;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&egui::ColorImage> {
        self.image.as_deref()
    }

    /// `[width, height]` of the current image.
    pub fn image_size(&self) -> Option<[usize; 2]> {
        self.image.as_ref().map(|img| img.size)
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Fit the image to the view on the next paint.
    pub fn reset_view(&mut self) {
        self.fit_pending = true;
    }

    /// Multiply the zoom by `factor`, keeping the point at `anchor`
    /// (relative to the view center) fixed on screen.
    pub fn zoom_about(&mut self, factor: f32, anchor: egui::Vec2) {
        let new_zoom = (self.zoom * factor).clamp(self.options.min_zoom, self.options.max_zoom);
        let mouse_rel = anchor - self.pan_offset;
        let scale_change = new_zoom / self.zoom;
        self.pan_offset += mouse_rel * (1.0 - scale_change);
        self.zoom = new_zoom;
    }

    pub fn fit_to_rect(&mut self, rect: egui::Rect) {
        let Some([w, h]) = self.image_size() else {
            return;
        };
        let available = rect.size();
        let fit_x = available.x / w as f32;
        let fit_y = available.y / h as f32;
        self.zoom = fit_x.min(fit_y).clamp(self.options.min_zoom, self.options.max_zoom);
        self.pan_offset = egui::Vec2::ZERO;
    }

    /// Screen rect covered by the image when drawn inside `rect`.
    pub fn image_rect(&self, rect: egui::Rect) -> Option<egui::Rect> {
        let [w, h] = self.image_size()?;
        let scaled = egui::vec2(w as f32, h as f32) * self.zoom;
        Some(egui::Rect::from_center_size(rect.center() + self.pan_offset, scaled))
    }

    /// Map a screen position to image pixel coordinates, `None` off the image.
    pub fn screen_to_image(&self, rect: egui::Rect, pos: egui::Pos2) -> Option<egui::Pos2> {
        let img_rect = self.image_rect(rect)?;
        if !img_rect.contains(pos) {
            return None;
        }
        Some(((pos - img_rect.min) / self.zoom).to_pos2())
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> ImageViewerResponse {
        let rect = ui.available_rect_before_wrap();
        paint_background(ui, rect);
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        self.upload_texture(ui.ctx());

        let Some(texture_id) = self.texture.as_ref().map(|t| t.id()) else {
            show_placeholder(ui, rect);
            return ImageViewerResponse {
                response,
                clicked: None,
                double_clicked: false,
                hover_pos: None,
            };
        };

        if self.fit_pending {
            self.fit_to_rect(rect);
            self.fit_pending = false;
        }

        self.handle_zoom(ui, &response, rect);
        self.handle_pan(&response);

        let double_clicked = response.double_clicked();
        if double_clicked {
            self.fit_to_rect(rect);
        }

        if let Some(img_rect) = self.image_rect(rect) {
            draw_image(ui, texture_id, img_rect);
        }

        let clicked = click_button(&response).and_then(|button| {
            let pos = response.interact_pointer_pos()?;
            Some(ImageClick {
                button,
                pos: self.screen_to_image(rect, pos)?,
            })
        });
        let hover_pos = response
            .hover_pos()
            .and_then(|pos| self.screen_to_image(rect, pos));

        ImageViewerResponse {
            response,
            clicked,
            double_clicked,
            hover_pos,
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty {
            return;
        }
        self.texture_dirty = false;

        let Some(image) = self.image.clone() else {
            self.texture = None;
            return;
        };
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    "tiffstack-frame",
                    image,
                    egui::TextureOptions::NEAREST,
                ));
            }
        }
    }

    fn handle_zoom(&mut self, ui: &egui::Ui, response: &egui::Response, rect: egui::Rect) {
        if !self.options.can_zoom || !response.hovered() {
            return;
        }
        let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
        if scroll_delta == 0.0 {
            return;
        }

        let factor = (scroll_delta * self.options.zoom_speed).exp();
        // Zoom toward mouse cursor
        let anchor = ui
            .input(|i| i.pointer.hover_pos())
            .map(|p| p - rect.center())
            .unwrap_or(egui::Vec2::ZERO);
        self.zoom_about(factor, anchor);
    }

    fn handle_pan(&mut self, response: &egui::Response) {
        if !self.options.can_pan {
            return;
        }
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan_offset += response.drag_delta();
        }
    }
}

impl Default for ImageViewer {
    fn default() -> Self {
        Self::new(ViewerOptions::default())
    }
}

fn click_button(response: &egui::Response) -> Option<egui::PointerButton> {
    if response.clicked() {
        Some(egui::PointerButton::Primary)
    } else if response.secondary_clicked() {
        Some(egui::PointerButton::Secondary)
    } else if response.middle_clicked() {
        Some(egui::PointerButton::Middle)
    } else {
        None
    }
}

fn paint_background(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter()
        .rect_filled(rect, 0.0, egui::Color32::from_gray(30));
}

fn draw_image(ui: &egui::Ui, texture_id: egui::TextureId, img_rect: egui::Rect) {
    ui.painter().image(
        texture_id,
        img_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
}

fn show_placeholder(ui: &egui::Ui, rect: egui::Rect) {
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "No image stack loaded",
        egui::FontId::proportional(18.0),
        egui::Color32::from_gray(100),
    );
}
