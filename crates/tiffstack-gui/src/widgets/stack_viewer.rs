use std::ops::RangeInclusive;
use std::path::Path;

use ndarray::Array3;
use tracing::{debug, warn};

use tiffstack_core::config::{DecodeLimits, ViewerConfig};
use tiffstack_core::display::Normalization;
use tiffstack_core::error::{Result, StackError};
use tiffstack_core::frame::{StackFrame, StackInfo};
use tiffstack_core::io::TiffStack;
use tiffstack_core::progress::{NoOpReporter, ProgressReporter};

use crate::convert::frame_to_color_image;
use crate::picker::{FilePicker, RfdPicker};
use crate::widgets::image_viewer::{ImageViewer, ImageViewerResponse};

pub struct StackViewerResponse {
    pub viewer: ImageViewerResponse,
    /// Frame slider, `None` while the controls are hidden.
    pub slider: Option<egui::Response>,
    /// Set when a different frame was shown since the previous pass.
    pub frame_changed: Option<usize>,
    /// First error raised by navigation during this pass.
    pub error: Option<StackError>,
}

/// Multi-page TIFF viewer: the current frame in an [`ImageViewer`] plus a
/// frame slider with previous/next buttons.
///
/// Frames are decoded synchronously when the index changes.
pub struct StackViewer {
    /// Embedded image viewer; configure zoom/pan or read its state here.
    pub viewer: ImageViewer,
    pub normalization: Normalization,
    limits: DecodeLimits,
    stack: Option<TiffStack>,
    current_frame_index: Option<usize>,
    frame_changed: Option<usize>,
}

impl StackViewer {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            viewer: ImageViewer::new(config.viewer.clone()),
            normalization: config.display.normalization,
            limits: config.limits.clone(),
            stack: None,
            current_frame_index: None,
            frame_changed: None,
        }
    }

    pub fn has_image_stack(&self) -> bool {
        self.stack.is_some()
    }

    pub fn clear_image_stack(&mut self) {
        if self.stack.take().is_some() {
            self.viewer.clear_image();
            self.current_frame_index = None;
        }
    }

    /// Adopt an already opened stack and show its first frame.
    ///
    /// Nothing changes when the first frame cannot be decoded.
    pub fn set_image_stack(&mut self, mut stack: TiffStack) -> Result<()> {
        let first = stack.read_frame(0)?;
        self.stack = Some(stack);
        if self.viewer.options.fit_on_load {
            self.viewer.reset_view();
        }
        self.show_frame(&first, 0);
        Ok(())
    }

    /// Load a stack from `path`, or from a file dialog when `path` is `None`.
    ///
    /// Returns `Ok(false)` without touching the current stack when the dialog
    /// is cancelled.
    pub fn load_image_stack(&mut self, path: Option<&Path>) -> Result<bool> {
        self.load_image_stack_with(&RfdPicker, path)
    }

    pub fn load_image_stack_with(
        &mut self,
        picker: &dyn FilePicker,
        path: Option<&Path>,
    ) -> Result<bool> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match picker.pick_stack_file() {
                Some(p) => p,
                None => {
                    debug!("Stack file selection cancelled");
                    return Ok(false);
                }
            },
        };

        let stack = TiffStack::open_with_limits(&path, &self.limits)?;
        self.set_image_stack(stack)?;
        Ok(true)
    }

    pub fn stack_info(&self) -> Option<&StackInfo> {
        self.stack.as_ref().map(|s| s.info())
    }

    pub fn num_frames(&self) -> usize {
        self.stack.as_ref().map_or(0, |s| s.frame_count())
    }

    pub fn current_frame_index(&self) -> Option<usize> {
        self.current_frame_index
    }

    /// Bounds of the frame slider, `None` without a stack.
    pub fn slider_range(&self) -> Option<RangeInclusive<usize>> {
        match self.num_frames() {
            0 => None,
            n => Some(0..=n - 1),
        }
    }

    /// Decode frame `index`, or the current frame when `index` is `None`.
    /// `Ok(None)` when there is no stack or no current frame.
    pub fn get_frame(&mut self, index: Option<usize>) -> Result<Option<StackFrame>> {
        let Some(index) = index.or(self.current_frame_index) else {
            return Ok(None);
        };
        match self.stack.as_mut() {
            Some(stack) => stack.read_frame(index).map(Some),
            None => Ok(None),
        }
    }

    /// Show frame `index` in the viewer, keeping its zoom and pan.
    pub fn display_frame(&mut self, index: usize) -> Result<()> {
        let Some(frame) = self.get_frame(Some(index))? else {
            return Ok(());
        };
        self.show_frame(&frame, index);
        Ok(())
    }

    fn show_frame(&mut self, frame: &StackFrame, index: usize) {
        self.viewer
            .set_image(frame_to_color_image(frame, self.normalization));
        self.current_frame_index = Some(index);
        self.frame_changed = Some(index);
    }

    /// Step back one frame. `Ok(false)` at the first frame.
    pub fn prev_frame(&mut self) -> Result<bool> {
        match self.current_frame_index {
            Some(i) if i > 0 => self.display_frame(i - 1).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Step forward one frame. `Ok(false)` at the last frame.
    pub fn next_frame(&mut self) -> Result<bool> {
        match self.current_frame_index {
            Some(i) if i + 1 < self.num_frames() => self.display_frame(i + 1).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Decode the whole grayscale stack into a (frames, height, width) array.
    ///
    /// Blocks until every frame is read. Color stacks are rejected with
    /// [`StackError::UnsupportedColorMode`].
    pub fn get_all_frames(&mut self) -> Result<Option<Array3<f32>>> {
        self.get_all_frames_reported(&NoOpReporter)
    }

    pub fn get_all_frames_reported(
        &mut self,
        reporter: &dyn ProgressReporter,
    ) -> Result<Option<Array3<f32>>> {
        match self.stack.as_mut() {
            Some(stack) => stack.all_frames_reported(reporter).map(Some),
            None => Ok(None),
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> StackViewerResponse {
        let mut error = None;
        let mut slider = None;

        if self.num_frames() > 1 {
            egui::TopBottomPanel::bottom(ui.id().with("stack_viewer_controls"))
                .show_inside(ui, |ui| {
                    let (response, result) = self.controls_ui(ui);
                    slider = Some(response);
                    if let Err(e) = result {
                        error.get_or_insert(e);
                    }
                });
        }

        let viewer = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show_inside(ui, |ui| self.viewer.ui(ui))
            .inner;

        if viewer.response.hovered() && self.num_frames() > 1 {
            let (left, right) = ui.input(|i| {
                (
                    i.key_pressed(egui::Key::ArrowLeft),
                    i.key_pressed(egui::Key::ArrowRight),
                )
            });
            let step = if left {
                Some(self.prev_frame())
            } else if right {
                Some(self.next_frame())
            } else {
                None
            };
            if let Some(Err(e)) = step {
                error.get_or_insert(e);
            }
        }

        if let Some(ref e) = error {
            warn!("Frame navigation failed: {e}");
        }

        StackViewerResponse {
            viewer,
            slider,
            frame_changed: self.frame_changed.take(),
            error,
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) -> (egui::Response, Result<()>) {
        let n = self.num_frames();
        let mut result = Ok(());

        let slider = ui.horizontal(|ui| {
            if ui.button("<").clicked() {
                result = self.prev_frame().map(|_| ());
            }

            let widest_label = format!("{n}/{n}");
            let reserved = ui.spacing().interact_size.x + 8.0 * widest_label.len() as f32;
            ui.spacing_mut().slider_width = (ui.available_width() - reserved).max(50.0);
            let current = self.current_frame_index.unwrap_or(0);
            let mut idx = current;
            let response = ui.add(
                egui::Slider::new(&mut idx, 0..=n - 1)
                    .show_value(false)
                    .clamping(egui::SliderClamping::Always),
            );
            if response.changed() && idx != current {
                result = self.display_frame(idx);
            }

            if ui.button(">").clicked() {
                result = self.next_frame().map(|_| ());
            }
            ui.label(format!("{}/{}", self.current_frame_index.unwrap_or(0) + 1, n));
            response
        });

        (slider.inner, result)
    }
}

impl Default for StackViewer {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ndarray::{Array2, Axis};
    use tiffstack_core::frame::{Frame, SampleKind};
    use tiffstack_core::io::image_io::write_stack;

    use super::*;

    struct CancelledPicker;
    impl FilePicker for CancelledPicker {
        fn pick_stack_file(&self) -> Option<PathBuf> {
            None
        }
    }

    struct FixedPicker(PathBuf);
    impl FilePicker for FixedPicker {
        fn pick_stack_file(&self) -> Option<PathBuf> {
            Some(self.0.clone())
        }
    }

    /// Frames with distinct patterns so their min-max renderings differ.
    fn write_fixture(path: &Path, width: usize, height: usize, frames: usize) {
        let pages: Vec<StackFrame> = (0..frames)
            .map(|k| {
                let data = Array2::from_shape_fn((height, width), |(r, c)| {
                    (((r * width + c) * (k + 3)) % 17) as f32 * 1000.0
                });
                StackFrame::Mono(Frame::new(data, 16, SampleKind::Unsigned))
            })
            .collect();
        write_stack(path, &pages).unwrap();
    }

    fn fixture(frames: usize) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.tif");
        write_fixture(&path, 6, 4, frames);
        (dir, path)
    }

    fn expected_image(path: &Path, index: usize) -> egui::ColorImage {
        let frame = TiffStack::open(path).unwrap().read_frame(index).unwrap();
        frame_to_color_image(&frame, Normalization::MinMax)
    }

    #[test]
    fn test_load_resets_slider_and_shows_first_frame() {
        let (_dir, path) = fixture(5);
        let mut sv = StackViewer::default();

        assert!(sv.load_image_stack(Some(&path)).unwrap());
        assert!(sv.has_image_stack());
        assert_eq!(sv.num_frames(), 5);
        assert_eq!(sv.slider_range(), Some(0..=4));
        assert_eq!(sv.current_frame_index(), Some(0));
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 0)));
    }

    #[test]
    fn test_every_index_shows_matching_frame() {
        let (_dir, path) = fixture(4);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        for k in [3, 1, 0, 2] {
            sv.display_frame(k).unwrap();
            assert_eq!(sv.current_frame_index(), Some(k));
            assert_eq!(sv.viewer.image(), Some(&expected_image(&path, k)));
        }
        assert_ne!(expected_image(&path, 0), expected_image(&path, 1));
    }

    #[test]
    fn test_cancelled_dialog_keeps_state() {
        let (_dir, path) = fixture(4);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();
        sv.display_frame(2).unwrap();

        assert!(!sv.load_image_stack_with(&CancelledPicker, None).unwrap());
        assert_eq!(sv.num_frames(), 4);
        assert_eq!(sv.current_frame_index(), Some(2));
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 2)));
    }

    #[test]
    fn test_cancelled_dialog_without_stack() {
        let mut sv = StackViewer::default();
        assert!(!sv.load_image_stack_with(&CancelledPicker, None).unwrap());
        assert!(!sv.has_image_stack());
        assert_eq!(sv.slider_range(), None);
        assert!(!sv.viewer.has_image());
    }

    #[test]
    fn test_picked_file_is_loaded() {
        let (_dir, path) = fixture(3);
        let mut sv = StackViewer::default();
        assert!(sv
            .load_image_stack_with(&FixedPicker(path.clone()), None)
            .unwrap());
        assert_eq!(sv.stack_info().unwrap().filename.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_get_all_frames_shape_and_slices() {
        let (_dir, path) = fixture(3);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        let all = sv.get_all_frames().unwrap().unwrap();
        assert_eq!(all.shape(), &[3, 4, 6]);
        for k in 0..3 {
            let frame = sv.get_frame(Some(k)).unwrap().unwrap();
            assert_eq!(all.index_axis(Axis(0), k), frame.as_mono().unwrap().data);
        }
        // Reading the whole stack does not move the current frame.
        assert_eq!(sv.current_frame_index(), Some(0));
    }

    #[test]
    fn test_get_all_frames_without_stack() {
        let mut sv = StackViewer::default();
        assert!(sv.get_all_frames().unwrap().is_none());
        assert!(sv.get_frame(None).unwrap().is_none());
        assert_eq!(sv.num_frames(), 0);
    }

    #[test]
    fn test_navigation_keeps_zoom_and_pan() {
        let (_dir, path) = fixture(4);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();
        sv.viewer.zoom = 3.0;
        sv.viewer.pan_offset = egui::vec2(-20.0, 7.5);

        sv.next_frame().unwrap();
        sv.display_frame(3).unwrap();
        sv.prev_frame().unwrap();

        assert_eq!(sv.current_frame_index(), Some(2));
        assert_eq!(sv.viewer.zoom, 3.0);
        assert_eq!(sv.viewer.pan_offset, egui::vec2(-20.0, 7.5));
    }

    #[test]
    fn test_prev_next_stop_at_ends() {
        let (_dir, path) = fixture(2);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        assert!(!sv.prev_frame().unwrap());
        assert_eq!(sv.current_frame_index(), Some(0));
        assert!(sv.next_frame().unwrap());
        assert!(!sv.next_frame().unwrap());
        assert_eq!(sv.current_frame_index(), Some(1));
    }

    #[test]
    fn test_out_of_range_keeps_current_frame() {
        let (_dir, path) = fixture(3);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();
        sv.display_frame(1).unwrap();

        assert!(matches!(
            sv.display_frame(3),
            Err(StackError::FrameIndexOutOfRange { index: 3, total: 3 })
        ));
        assert_eq!(sv.current_frame_index(), Some(1));
    }

    #[test]
    fn test_unreadable_file_keeps_previous_stack() {
        let (dir, path) = fixture(3);
        let bogus = dir.path().join("bogus.tif");
        std::fs::write(&bogus, b"not a tiff").unwrap();

        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();
        assert!(matches!(
            sv.load_image_stack(Some(&bogus)),
            Err(StackError::Tiff(_))
        ));
        assert_eq!(sv.num_frames(), 3);
        assert_eq!(sv.current_frame_index(), Some(0));
    }

    #[test]
    fn test_undecodable_first_frame_keeps_previous_stack() {
        let (dir, path) = fixture(3);
        let other = dir.path().join("other.tif");
        write_fixture(&other, 5, 2, 2);

        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();
        sv.display_frame(2).unwrap();

        // Opening only reads the header; decoding frame 0 hits the limit.
        sv.limits.decoding_buffer_mb = 0;
        assert!(matches!(
            sv.load_image_stack(Some(&other)),
            Err(StackError::Tiff(_))
        ));

        assert_eq!(sv.num_frames(), 3);
        assert_eq!(sv.current_frame_index(), Some(2));
        assert_eq!(
            sv.stack_info().unwrap().filename.as_deref(),
            Some(path.as_path())
        );
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 2)));
    }

    #[test]
    fn test_clear_image_stack() {
        let (_dir, path) = fixture(2);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        sv.clear_image_stack();
        assert!(!sv.has_image_stack());
        assert!(!sv.viewer.has_image());
        assert_eq!(sv.current_frame_index(), None);
    }

    #[test]
    fn test_ui_reports_frame_change() {
        let (_dir, path) = fixture(3);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        let ctx = egui::Context::default();
        let mut changed = Vec::new();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    changed.push(sv.ui(ui).frame_changed);
                });
            });
        }

        assert_eq!(changed.first(), Some(&Some(0)));
        assert!(changed[1..].iter().all(Option::is_none));
        assert!(sv.viewer.has_texture());
    }

    fn screen() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    fn key(key: egui::Key) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Run one UI frame; returns the reported frame changes and the slider rect.
    fn run_frame(
        ctx: &egui::Context,
        sv: &mut StackViewer,
        events: Vec<egui::Event>,
    ) -> (Vec<usize>, Option<egui::Rect>) {
        let mut changed = Vec::new();
        let mut slider = None;
        let input = egui::RawInput {
            screen_rect: Some(screen()),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let response = sv.ui(ui);
                changed.extend(response.frame_changed);
                slider = response.slider.map(|r| r.rect);
            });
        });
        (changed, slider)
    }

    /// Load `frames` pages and settle the layout; returns the slider rect.
    fn settled(frames: usize) -> (tempfile::TempDir, PathBuf, StackViewer, egui::Context, egui::Rect) {
        let (dir, path) = fixture(frames);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        let ctx = egui::Context::default();
        run_frame(&ctx, &mut sv, vec![]);
        let (_, slider) = run_frame(&ctx, &mut sv, vec![]);
        (dir, path, sv, ctx, slider.expect("controls shown"))
    }

    #[test]
    fn test_arrow_keys_step_frames_while_hovered() {
        let (_dir, path, mut sv, ctx, _) = settled(3);
        run_frame(&ctx, &mut sv, vec![egui::Event::PointerMoved(screen().center())]);
        run_frame(&ctx, &mut sv, vec![]);
        let (zoom, pan) = (sv.viewer.zoom, sv.viewer.pan_offset);

        let (changed, _) = run_frame(&ctx, &mut sv, vec![key(egui::Key::ArrowRight)]);
        assert_eq!(changed, vec![1]);
        assert_eq!(sv.current_frame_index(), Some(1));
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 1)));

        let (changed, _) = run_frame(&ctx, &mut sv, vec![key(egui::Key::ArrowLeft)]);
        assert_eq!(changed, vec![0]);
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 0)));

        let (changed, _) = run_frame(&ctx, &mut sv, vec![key(egui::Key::ArrowLeft)]);
        assert!(changed.is_empty());
        assert_eq!(sv.current_frame_index(), Some(0));

        assert_eq!(sv.viewer.zoom, zoom);
        assert_eq!(sv.viewer.pan_offset, pan);
    }

    #[test]
    fn test_slider_drag_selects_frame() {
        let (_dir, path, mut sv, ctx, slider) = settled(5);
        let (zoom, pan) = (sv.viewer.zoom, sv.viewer.pan_offset);

        let start = slider.left_center() + egui::vec2(2.0, 0.0);
        let end = slider.right_center() - egui::vec2(2.0, 0.0);
        let mut changed = Vec::new();
        for events in [
            vec![egui::Event::PointerMoved(start), button(start, true)],
            vec![egui::Event::PointerMoved(end)],
            vec![button(end, false)],
        ] {
            changed.extend(run_frame(&ctx, &mut sv, events).0);
        }

        assert_eq!(changed, vec![4]);
        assert_eq!(sv.current_frame_index(), Some(4));
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 4)));
        assert_eq!(sv.viewer.zoom, zoom);
        assert_eq!(sv.viewer.pan_offset, pan);
    }

    #[test]
    fn test_step_buttons_beside_slider() {
        let (_dir, path, mut sv, ctx, slider) = settled(3);
        let gap = egui::vec2(egui::Style::default().spacing.item_spacing.x + 4.0, 0.0);
        let click = |ctx: &egui::Context, sv: &mut StackViewer, pos: egui::Pos2| {
            let mut changed = run_frame(ctx, sv, vec![egui::Event::PointerMoved(pos), button(pos, true)]).0;
            changed.extend(run_frame(ctx, sv, vec![button(pos, false)]).0);
            changed
        };

        assert_eq!(click(&ctx, &mut sv, slider.right_center() + gap), vec![1]);
        assert_eq!(sv.viewer.image(), Some(&expected_image(&path, 1)));

        assert_eq!(click(&ctx, &mut sv, slider.left_center() - gap), vec![0]);
        assert_eq!(sv.current_frame_index(), Some(0));
    }

    #[test]
    fn test_single_frame_hides_controls() {
        let (_dir, path) = fixture(1);
        let mut sv = StackViewer::default();
        sv.load_image_stack(Some(&path)).unwrap();

        let ctx = egui::Context::default();
        let (_, slider) = run_frame(&ctx, &mut sv, vec![]);
        assert!(slider.is_none());
    }
}
