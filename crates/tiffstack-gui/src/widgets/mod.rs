pub mod image_viewer;
pub mod stack_viewer;
