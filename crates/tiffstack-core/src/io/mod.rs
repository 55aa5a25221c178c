pub mod image_io;
pub mod tiff_stack;

pub use tiff_stack::TiffStack;
