//! egui widgets for browsing multi-page TIFF stacks.
//!
//! [`StackViewer`] is the composite widget: an [`ImageViewer`] for the
//! current frame plus a slider, previous/next buttons and a frame label.

pub mod convert;
pub mod picker;
pub mod widgets;

pub use picker::{FilePicker, RfdPicker};
pub use widgets::image_viewer::{ImageClick, ImageViewer, ImageViewerResponse};
pub use widgets::stack_viewer::{StackViewer, StackViewerResponse};
