use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF decoding error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid TIFF page {index}: {reason}")]
    InvalidPage { index: usize, reason: String },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Frame {index} is {found_width}x{found_height}, expected {width}x{height}")]
    InconsistentFrameShape {
        index: usize,
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("Unsupported color mode: {0}")]
    UnsupportedColorMode(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, StackError>;
