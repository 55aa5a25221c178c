use image::{Rgb, RgbImage};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, StackFrame};

/// How raw sample values are mapped onto the 0..255 display range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Normalization {
    /// Stretch each frame's own min..max.
    #[default]
    MinMax,
    /// Use the nominal range of the source sample type.
    SampleRange,
    /// Use explicit bounds.
    Fixed { low: f32, high: f32 },
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinMax => write!(f, "Min/Max"),
            Self::SampleRange => write!(f, "Sample range"),
            Self::Fixed { low, high } => write!(f, "Fixed ({low}..{high})"),
        }
    }
}

/// Convert a decoded frame to an 8-bit RGB image for display.
pub fn to_rgb8(frame: &StackFrame, normalization: Normalization) -> RgbImage {
    match frame {
        StackFrame::Mono(f) => {
            let (low, high) = resolve_range(normalization, f, &[&f.data]);
            let w = f.width();
            let h = f.height();
            let mut img = RgbImage::new(w as u32, h as u32);
            for ((row, col), &v) in f.data.indexed_iter() {
                let g = scale(v, low, high);
                img.put_pixel(col as u32, row as u32, Rgb([g, g, g]));
            }
            img
        }
        StackFrame::Color(cf) => {
            let (low, high) = resolve_range(
                normalization,
                &cf.red,
                &[&cf.red.data, &cf.green.data, &cf.blue.data],
            );
            let w = cf.width();
            let h = cf.height();
            let mut img = RgbImage::new(w as u32, h as u32);
            for row in 0..h {
                for col in 0..w {
                    let r = scale(cf.red.data[[row, col]], low, high);
                    let g = scale(cf.green.data[[row, col]], low, high);
                    let b = scale(cf.blue.data[[row, col]], low, high);
                    img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
                }
            }
            img
        }
    }
}

/// Convert a single grayscale frame to 8-bit luma values, row-major.
pub fn to_gray8(frame: &Frame, normalization: Normalization) -> Vec<u8> {
    let (low, high) = resolve_range(normalization, frame, &[&frame.data]);
    frame.data.iter().map(|&v| scale(v, low, high)).collect()
}

fn resolve_range(normalization: Normalization, reference: &Frame, planes: &[&Array2<f32>]) -> (f32, f32) {
    match normalization {
        Normalization::MinMax => finite_min_max(planes),
        Normalization::SampleRange => reference.sample_range(),
        Normalization::Fixed { low, high } => (low, high),
    }
}

/// Min and max over all finite values, (0, 0) when there are none.
pub fn finite_min_max(planes: &[&Array2<f32>]) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for plane in planes {
        for &v in plane.iter().filter(|v| v.is_finite()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}

fn scale(v: f32, low: f32, high: f32) -> u8 {
    let span = high - low;
    if !v.is_finite() || span <= 0.0 {
        return 0;
    }
    (((v - low) / span).clamp(0.0, 1.0) * 255.0).round() as u8
}
