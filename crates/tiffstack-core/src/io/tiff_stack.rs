use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ndarray::{s, Array2, Array3, Array4, Axis};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;
use tracing::{debug, info};

use crate::config::DecodeLimits;
use crate::error::{Result, StackError};
use crate::frame::{ColorFrame, ColorMode, Frame, FrameMetadata, SampleKind, StackFrame, StackInfo};
use crate::progress::{NoOpReporter, ProgressReporter};

/// Random-access reader over the pages of a multi-page TIFF.
///
/// Pages are decoded on demand; nothing is cached between reads.
pub struct TiffStack<R: Read + Seek = BufReader<File>> {
    decoder: Decoder<R>,
    info: StackInfo,
}

impl TiffStack {
    /// Open a TIFF file and count its pages.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_limits(path, &DecodeLimits::default())
    }

    pub fn open_with_limits(path: &Path, limits: &DecodeLimits) -> Result<Self> {
        let file = File::open(path)?;
        let mut stack = TiffStack::from_reader_with_limits(BufReader::new(file), limits)?;
        stack.info.filename = Some(path.to_path_buf());
        info!(
            "Opened {} ({}x{}, {} frames, {})",
            path.display(),
            stack.info.width,
            stack.info.height,
            stack.info.total_frames,
            stack.info.color_mode
        );
        Ok(stack)
    }
}

impl<R: Read + Seek> TiffStack<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_with_limits(reader, &DecodeLimits::default())
    }

    pub fn from_reader_with_limits(reader: R, limits: &DecodeLimits) -> Result<Self> {
        let mut decoder = Decoder::new(reader)?.with_limits(limits.to_tiff_limits());

        let (width, height) = decoder.dimensions()?;
        if width == 0 || height == 0 {
            return Err(StackError::InvalidDimensions { width, height });
        }
        let (color_mode, bit_depth) = color_mode_of(decoder.colortype()?)?;

        // A decoder is always positioned on a valid first page.
        let mut total_frames = 1;
        while decoder.more_images() {
            decoder.next_image()?;
            total_frames += 1;
        }
        if total_frames > 1 {
            decoder.seek_to_image(0)?;
        }

        Ok(Self {
            decoder,
            info: StackInfo {
                filename: None,
                total_frames,
                width,
                height,
                bit_depth,
                color_mode,
            },
        })
    }

    pub fn frame_count(&self) -> usize {
        self.info.total_frames
    }

    pub fn info(&self) -> &StackInfo {
        &self.info
    }

    /// Bytes needed to hold every frame as f32.
    pub fn estimated_bytes(&self) -> usize {
        let channels = if self.info.color_mode.is_color() { 3 } else { 1 };
        self.info.total_frames
            * self.info.width as usize
            * self.info.height as usize
            * channels
            * std::mem::size_of::<f32>()
    }

    /// Seek to page `index` and decode it.
    pub fn read_frame(&mut self, index: usize) -> Result<StackFrame> {
        let total = self.frame_count();
        if index >= total {
            return Err(StackError::FrameIndexOutOfRange { index, total });
        }

        self.decoder.seek_to_image(index)?;
        let (width, height) = self.decoder.dimensions()?;
        let (color_mode, bit_depth) = color_mode_of(self.decoder.colortype()?)?;
        let w = width as usize;
        let h = height as usize;
        let spp = color_mode.samples_per_pixel();

        let (samples, sample_kind) = match self.decoder.read_image()? {
            DecodingResult::U8(buf) if bit_depth < 8 => {
                (unpack_samples(&buf, w * spp, h, bit_depth, index)?, SampleKind::Unsigned)
            }
            result => decode_samples(result, index)?,
        };
        debug!("Decoded frame {index} ({width}x{height}, {bit_depth}-bit {color_mode})");

        if samples.len() < w * h * spp {
            return Err(StackError::InvalidPage {
                index,
                reason: format!("expected {} samples, got {}", w * h * spp, samples.len()),
            });
        }

        let plane = |channel: usize| {
            let mut frame = Frame::new(
                Array2::from_shape_fn((h, w), |(row, col)| samples[(row * w + col) * spp + channel]),
                bit_depth,
                sample_kind,
            );
            frame.metadata = FrameMetadata { frame_index: index };
            frame
        };

        Ok(if color_mode.is_color() {
            StackFrame::Color(ColorFrame {
                red: plane(0),
                green: plane(1),
                blue: plane(2),
            })
        } else {
            StackFrame::Mono(plane(0))
        })
    }

    /// Iterator over all frames, in page order.
    pub fn frames(&mut self) -> impl Iterator<Item = Result<StackFrame>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }

    /// Decode every frame of a grayscale stack into one array of shape
    /// (frames, height, width).
    pub fn all_frames(&mut self) -> Result<Array3<f32>> {
        self.all_frames_reported(&NoOpReporter)
    }

    pub fn all_frames_reported(&mut self, reporter: &dyn ProgressReporter) -> Result<Array3<f32>> {
        if self.info.color_mode.is_color() {
            return Err(StackError::UnsupportedColorMode(format!(
                "{} stack cannot be flattened to a grayscale array; use all_color_frames",
                self.info.color_mode
            )));
        }

        let (h, w) = (self.info.height as usize, self.info.width as usize);
        let mut out = Array3::<f32>::zeros((self.frame_count(), h, w));
        self.for_each_frame(reporter, |i, frame| match frame {
            StackFrame::Mono(f) => {
                out.index_axis_mut(Axis(0), i).assign(&f.data);
                Ok(())
            }
            StackFrame::Color(_) => Err(StackError::UnsupportedColorMode(format!(
                "frame {i} is color in a grayscale stack"
            ))),
        })?;
        Ok(out)
    }

    /// Decode every frame into one array of shape (frames, height, width, 3).
    /// Grayscale frames are replicated across the three channels.
    pub fn all_color_frames(&mut self) -> Result<Array4<f32>> {
        self.all_color_frames_reported(&NoOpReporter)
    }

    pub fn all_color_frames_reported(&mut self, reporter: &dyn ProgressReporter) -> Result<Array4<f32>> {
        let (h, w) = (self.info.height as usize, self.info.width as usize);
        let mut out = Array4::<f32>::zeros((self.frame_count(), h, w, 3));
        self.for_each_frame(reporter, |i, frame| {
            match frame {
                StackFrame::Mono(f) => {
                    for c in 0..3 {
                        out.slice_mut(s![i, .., .., c]).assign(&f.data);
                    }
                }
                StackFrame::Color(cf) => {
                    out.slice_mut(s![i, .., .., 0]).assign(&cf.red.data);
                    out.slice_mut(s![i, .., .., 1]).assign(&cf.green.data);
                    out.slice_mut(s![i, .., .., 2]).assign(&cf.blue.data);
                }
            }
            Ok(())
        })?;
        Ok(out)
    }

    fn for_each_frame(
        &mut self,
        reporter: &dyn ProgressReporter,
        mut sink: impl FnMut(usize, StackFrame) -> Result<()>,
    ) -> Result<()> {
        let total = self.frame_count();
        let (width, height) = (self.info.width as usize, self.info.height as usize);
        reporter.begin(total);

        for i in 0..total {
            if reporter.is_cancelled() {
                debug!("Whole-stack read cancelled at frame {i}");
                return Err(StackError::Cancelled);
            }
            let frame = self.read_frame(i)?;
            if frame.width() != width || frame.height() != height {
                return Err(StackError::InconsistentFrameShape {
                    index: i,
                    width,
                    height,
                    found_width: frame.width(),
                    found_height: frame.height(),
                });
            }
            sink(i, frame)?;
            reporter.advance(i + 1);
        }

        reporter.finish();
        Ok(())
    }
}

fn color_mode_of(color_type: ColorType) -> Result<(ColorMode, u8)> {
    match color_type {
        ColorType::Gray(bits) => Ok((ColorMode::Gray, bits)),
        ColorType::GrayA(bits) => Ok((ColorMode::GrayAlpha, bits)),
        ColorType::RGB(bits) => Ok((ColorMode::Rgb, bits)),
        ColorType::RGBA(bits) => Ok((ColorMode::Rgba, bits)),
        other => Err(StackError::UnsupportedColorMode(format!("{other:?}"))),
    }
}

/// Sample types a TIFF page can decode to.
trait Sample: Copy {
    const KIND: SampleKind;
    fn to_f32(self) -> f32;
}

macro_rules! impl_sample {
    ($kind:ident: $($t:ty),*) => {
        $(
            impl Sample for $t {
                const KIND: SampleKind = SampleKind::$kind;
                #[inline]
                fn to_f32(self) -> f32 {
                    self as f32
                }
            }
        )*
    };
}

impl_sample!(Unsigned: u8, u16, u32, u64);
impl_sample!(Signed: i8, i16, i32, i64);
impl_sample!(Float: f32, f64);

fn convert<T: Sample>(buf: &[T]) -> (Vec<f32>, SampleKind) {
    (buf.iter().map(|&v| v.to_f32()).collect(), T::KIND)
}

/// Expand bit-packed samples (1, 2 or 4 bits, MSB first) into one value
/// per sample. Every row starts on a byte boundary.
fn unpack_samples(buf: &[u8], row_samples: usize, rows: usize, bits: u8, index: usize) -> Result<Vec<f32>> {
    if bits == 0 || 8 % bits != 0 {
        return Err(StackError::UnsupportedColorMode(format!("{bits}-bit packed samples")));
    }
    let bits = bits as usize;
    let row_bytes = (row_samples * bits).div_ceil(8);
    if buf.len() < row_bytes * rows {
        return Err(StackError::InvalidPage {
            index,
            reason: format!("expected {} packed bytes, got {}", row_bytes * rows, buf.len()),
        });
    }

    let mask = (1u8 << bits) - 1;
    let mut out = Vec::with_capacity(row_samples * rows);
    for row in buf.chunks_exact(row_bytes).take(rows) {
        for i in 0..row_samples {
            let bit = i * bits;
            let shift = 8 - bits - bit % 8;
            out.push(((row[bit / 8] >> shift) & mask) as f32);
        }
    }
    Ok(out)
}

#[allow(unreachable_patterns)]
fn decode_samples(result: DecodingResult, index: usize) -> Result<(Vec<f32>, SampleKind)> {
    Ok(match result {
        DecodingResult::U8(buf) => convert(&buf),
        DecodingResult::U16(buf) => convert(&buf),
        DecodingResult::U32(buf) => convert(&buf),
        DecodingResult::U64(buf) => convert(&buf),
        DecodingResult::I8(buf) => convert(&buf),
        DecodingResult::I16(buf) => convert(&buf),
        DecodingResult::I32(buf) => convert(&buf),
        DecodingResult::I64(buf) => convert(&buf),
        DecodingResult::F32(buf) => convert(&buf),
        DecodingResult::F64(buf) => convert(&buf),
        DecodingResult::F16(buf) => (buf.iter().map(|&v| v.to_f32()).collect(), SampleKind::Float),
        _ => {
            return Err(StackError::InvalidPage {
                index,
                reason: "unsupported sample format".into(),
            })
        }
    })
}
