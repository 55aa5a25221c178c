#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use tiff::encoder::{colortype, TiffEncoder};

/// Pixel value of a synthetic 16-bit page: unique per (page, row, col).
pub fn gray16_value(page: usize, row: usize, col: usize, width: usize) -> u16 {
    (page * 100 + row * width + col) as u16
}

/// Build `frames` synthetic 16-bit grayscale pages.
pub fn gray16_pages(width: u32, height: u32, frames: usize) -> Vec<Vec<u16>> {
    (0..frames)
        .map(|page| {
            let w = width as usize;
            (0..height as usize)
                .flat_map(|row| (0..w).map(move |col| gray16_value(page, row, col, w)))
                .collect()
        })
        .collect()
}

/// Write 16-bit grayscale pages as a multi-page TIFF.
pub fn write_gray16_stack(path: &Path, width: u32, height: u32, pages: &[Vec<u16>]) {
    let mut encoder = TiffEncoder::new(File::create(path).expect("create tiff")).expect("encoder");
    for page in pages {
        encoder
            .write_image::<colortype::Gray16>(width, height, page)
            .expect("write page");
    }
}

/// Write interleaved 8-bit RGB pages as a multi-page TIFF.
pub fn write_rgb8_stack(path: &Path, width: u32, height: u32, pages: &[Vec<u8>]) {
    let mut encoder = TiffEncoder::new(File::create(path).expect("create tiff")).expect("encoder");
    for page in pages {
        encoder
            .write_image::<colortype::RGB8>(width, height, page)
            .expect("write page");
    }
}

/// Write a synthetic gray16 stack into a fresh temp dir.
///
/// The file stays alive as long as the returned `TempDir` is not dropped.
pub fn temp_gray16_stack(width: u32, height: u32, frames: usize) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("stack.tif");
    write_gray16_stack(&path, width, height, &gray16_pages(width, height, frames));
    (dir, path)
}

/// Little-endian TIFF bytes for one uncompressed, BlackIsZero page with
/// `bits` bits per sample. `packed` holds the rows, each padded to a byte.
pub fn packed_gray_tiff_bytes(width: u16, height: u16, bits: u16, packed: &[u8]) -> Vec<u8> {
    const SHORT: u16 = 3;
    const LONG: u16 = 4;
    let entries: [(u16, u16, u32); 9] = [
        (256, SHORT, width as u32),  // ImageWidth
        (257, SHORT, height as u32), // ImageLength
        (258, SHORT, bits as u32),   // BitsPerSample
        (259, SHORT, 1),             // Compression: none
        (262, SHORT, 1),             // PhotometricInterpretation: BlackIsZero
        (273, LONG, 0),              // StripOffsets, patched below
        (277, SHORT, 1),             // SamplesPerPixel
        (278, SHORT, height as u32), // RowsPerStrip
        (279, LONG, packed.len() as u32),
    ];
    let data_offset = 8 + 2 + entries.len() as u32 * 12 + 4;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for (tag, kind, value) in entries {
        let value = if tag == 273 { data_offset } else { value };
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        if kind == SHORT {
            out.extend_from_slice(&(value as u16).to_le_bytes());
            out.extend_from_slice(&[0, 0]);
        } else {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    out.extend_from_slice(packed);
    out
}
