use tiffstack_core::display::{to_rgb8, Normalization};
use tiffstack_core::frame::StackFrame;

/// Convert a decoded frame to an egui ColorImage.
pub fn frame_to_color_image(frame: &StackFrame, normalization: Normalization) -> egui::ColorImage {
    let rgb = to_rgb8(frame, normalization);
    let size = [rgb.width() as usize, rgb.height() as usize];
    egui::ColorImage::from_rgb(size, rgb.as_raw())
}
