use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use image::{GrayImage, ImageFormat};
use tiff::encoder::{colortype, TiffEncoder};

use crate::display::{to_gray8, to_rgb8, Normalization};
use crate::error::{Result, StackError};
use crate::frame::{ColorFrame, Frame, SampleKind, StackFrame};

/// Integer pages up to 16 bits are written as-is, everything else as f32.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PageEncoding {
    U8,
    U16,
    F32,
}

fn page_encoding(frame: &Frame) -> PageEncoding {
    match (frame.sample_kind, frame.bit_depth) {
        (SampleKind::Unsigned, 0..=8) => PageEncoding::U8,
        (SampleKind::Unsigned, 9..=16) => PageEncoding::U16,
        _ => PageEncoding::F32,
    }
}

/// Save a frame as an 8-bit PNG, stretched to its own min..max.
pub fn save_png(frame: &StackFrame, path: &Path) -> Result<()> {
    match frame {
        StackFrame::Mono(f) => {
            let pixels = to_gray8(f, Normalization::MinMax);
            let img = GrayImage::from_raw(f.width() as u32, f.height() as u32, pixels).ok_or(
                StackError::InvalidDimensions {
                    width: f.width() as u32,
                    height: f.height() as u32,
                },
            )?;
            img.save_with_format(path, ImageFormat::Png)?;
        }
        StackFrame::Color(_) => {
            to_rgb8(frame, Normalization::MinMax).save_with_format(path, ImageFormat::Png)?;
        }
    }
    Ok(())
}

/// Save a frame as a single-page TIFF without losing sample values.
pub fn save_tiff(frame: &StackFrame, path: &Path) -> Result<()> {
    write_stack(path, std::slice::from_ref(frame))
}

/// Save frame, choosing format from file extension (`png`, `tif` or `tiff`).
pub fn save_frame(frame: &StackFrame, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => save_png(frame, path),
        "tif" | "tiff" => save_tiff(frame, path),
        "" => Err(StackError::UnsupportedFormat(format!(
            "{} has no file extension",
            path.display()
        ))),
        other => Err(StackError::UnsupportedFormat(format!(".{other}"))),
    }
}

/// Write frames as the pages of a new multi-page TIFF.
pub fn write_stack(path: &Path, frames: &[StackFrame]) -> Result<()> {
    if frames.is_empty() {
        return Err(StackError::EmptySequence);
    }
    let mut encoder = TiffEncoder::new(File::create(path)?)?;
    for frame in frames {
        write_page(&mut encoder, frame)?;
    }
    tracing::debug!("Wrote {} pages to {}", frames.len(), path.display());
    Ok(())
}

fn write_page<W: Write + Seek>(encoder: &mut TiffEncoder<W>, frame: &StackFrame) -> Result<()> {
    let w = frame.width() as u32;
    let h = frame.height() as u32;

    match frame {
        StackFrame::Mono(f) => match page_encoding(f) {
            PageEncoding::U8 => {
                let data: Vec<u8> = f.data.iter().map(|&v| v as u8).collect();
                encoder.write_image::<colortype::Gray8>(w, h, &data)?;
            }
            PageEncoding::U16 => {
                let data: Vec<u16> = f.data.iter().map(|&v| v as u16).collect();
                encoder.write_image::<colortype::Gray16>(w, h, &data)?;
            }
            PageEncoding::F32 => {
                let data: Vec<f32> = f.data.iter().copied().collect();
                encoder.write_image::<colortype::Gray32Float>(w, h, &data)?;
            }
        },
        StackFrame::Color(cf) => match page_encoding(&cf.red) {
            PageEncoding::U8 => {
                let data: Vec<u8> = interleave(cf).map(|v| v as u8).collect();
                encoder.write_image::<colortype::RGB8>(w, h, &data)?;
            }
            PageEncoding::U16 => {
                let data: Vec<u16> = interleave(cf).map(|v| v as u16).collect();
                encoder.write_image::<colortype::RGB16>(w, h, &data)?;
            }
            PageEncoding::F32 => {
                let data: Vec<f32> = interleave(cf).collect();
                encoder.write_image::<colortype::RGB32Float>(w, h, &data)?;
            }
        },
    }
    Ok(())
}

fn interleave(cf: &ColorFrame) -> impl Iterator<Item = f32> + '_ {
    cf.red
        .data
        .iter()
        .zip(cf.green.data.iter())
        .zip(cf.blue.data.iter())
        .flat_map(|((&r, &g), &b)| [r, g, b])
}
