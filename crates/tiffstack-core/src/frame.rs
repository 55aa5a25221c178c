use ndarray::Array2;
use std::path::PathBuf;

/// Numeric interpretation of the samples a frame was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Unsigned,
    Signed,
    Float,
}

/// A single grayscale image plane.
/// Pixel values are the raw TIFF samples converted to f32, not rescaled.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Bits per sample in the source page
    pub bit_depth: u8,
    pub sample_kind: SampleKind,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8, sample_kind: SampleKind) -> Self {
        Self {
            data,
            bit_depth,
            sample_kind,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Nominal value range of the source sample type.
    pub fn sample_range(&self) -> (f32, f32) {
        match self.sample_kind {
            SampleKind::Unsigned => (0.0, (2f64.powi(self.bit_depth as i32) - 1.0) as f32),
            SampleKind::Signed => {
                let half = 2f64.powi(self.bit_depth as i32 - 1);
                (-half as f32, (half - 1.0) as f32)
            }
            SampleKind::Float => (0.0, 1.0),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    /// Page index within the stack
    pub frame_index: usize,
}

/// Color image composed of separate channel frames.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

impl ColorFrame {
    pub fn width(&self) -> usize {
        self.red.width()
    }

    pub fn height(&self) -> usize {
        self.red.height()
    }
}

/// One decoded page of a stack, either mono or color.
#[derive(Clone, Debug)]
#[allow(clippy::large_enum_variant)]
pub enum StackFrame {
    Mono(Frame),
    Color(ColorFrame),
}

impl StackFrame {
    pub fn width(&self) -> usize {
        match self {
            Self::Mono(f) => f.width(),
            Self::Color(cf) => cf.width(),
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Self::Mono(f) => f.height(),
            Self::Color(cf) => cf.height(),
        }
    }

    pub fn frame_index(&self) -> usize {
        match self {
            Self::Mono(f) => f.metadata.frame_index,
            Self::Color(cf) => cf.red.metadata.frame_index,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color(_))
    }

    pub fn as_mono(&self) -> Option<&Frame> {
        match self {
            Self::Mono(f) => Some(f),
            Self::Color(_) => None,
        }
    }
}

/// Channel layout of the pages in a stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn is_color(&self) -> bool {
        matches!(self, Self::Rgb | Self::Rgba)
    }

    /// Samples per pixel as stored in the file.
    pub fn samples_per_pixel(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gray => write!(f, "Grayscale"),
            Self::GrayAlpha => write!(f, "Grayscale + alpha"),
            Self::Rgb => write!(f, "RGB"),
            Self::Rgba => write!(f, "RGBA"),
        }
    }
}

/// Metadata about an opened stack, taken from its first page.
#[derive(Clone, Debug)]
pub struct StackInfo {
    pub filename: Option<PathBuf>,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
}
