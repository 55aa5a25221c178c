use ndarray::parallel::prelude::*;
use ndarray::{Array3, Axis};

/// Summary values for one frame of a stack.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStats {
    pub frame_index: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
}

/// Per-frame min, max and mean of a (frames, height, width) array.
/// Non-finite samples are skipped.
pub fn frame_statistics(stack: &Array3<f32>) -> Vec<FrameStats> {
    stack
        .axis_iter(Axis(0))
        .into_par_iter()
        .enumerate()
        .map(|(frame_index, plane)| {
            let mut min = f32::INFINITY;
            let mut max = f32::NEG_INFINITY;
            let mut sum = 0.0f64;
            let mut count = 0usize;
            for &v in plane.iter().filter(|v| v.is_finite()) {
                min = min.min(v);
                max = max.max(v);
                sum += v as f64;
                count += 1;
            }
            if count == 0 {
                return FrameStats { frame_index, min: f32::NAN, max: f32::NAN, mean: f64::NAN };
            }
            FrameStats {
                frame_index,
                min,
                max,
                mean: sum / count as f64,
            }
        })
        .collect()
}
