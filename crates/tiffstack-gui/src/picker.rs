use std::path::PathBuf;

/// Source of the path used when a stack is loaded without one.
pub trait FilePicker {
    /// Ask for a stack file; `None` when the user cancels.
    fn pick_stack_file(&self) -> Option<PathBuf>;
}

/// Native open-file dialog.
pub struct RfdPicker;

impl FilePicker for RfdPicker {
    fn pick_stack_file(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Open TIFF stack file")
            .add_filter("TIFF files", &["tif", "tiff"])
            .add_filter("All files", &["*"])
            .pick_file()
    }
}
