use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use tiny_skia::Pixmap;
use tracing::{info, warn};

use crate::annotation::{AnnotationId, LineStyle};
use crate::export::{export_file_name, render_export};
use crate::fonts::FontBook;
use crate::ingest::{parse_candidates, IngestError};
use crate::interaction::Mode;
use crate::prefs::{self, PreferenceStore};
use crate::render::{pixmap_from_image, render_base, render_overlay, Scene};
use crate::store::{AnnotationStore, Commit};
use crate::style::StyleOptions;
use crate::transform::{fit_to_container, rescale_ratio, Size, Viewport};

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 48.0;

pub struct EditorImage {
    pub dynamic: DynamicImage,
    pub pixmap: Pixmap,
    pub file_stem: Option<String>,
}

impl EditorImage {
    pub fn new(dynamic: DynamicImage, file_stem: Option<String>) -> Result<Self> {
        let pixmap = pixmap_from_image(&dynamic)?;
        Ok(Self {
            dynamic,
            pixmap,
            file_stem,
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let dynamic =
            image::open(path).with_context(|| format!("cannot open image {}", path.display()))?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Self::new(dynamic, stem)
    }

    pub fn natural_size(&self) -> Size {
        Size::new(self.pixmap.width() as f32, self.pixmap.height() as f32)
    }
}

/// Photo rasterized at one canvas size and scale, reused until either changes.
struct BaseFrame {
    canvas: Size,
    scale: f32,
    pixmap: Pixmap,
}

/// Outcome of applying an AI suggestion batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// The whole editor: image, annotations with their history, style, viewport and the current
/// gesture. UI code talks to it only through the methods here and in `interaction`.
pub struct EditorState {
    pub image: Option<EditorImage>,
    pub store: AnnotationStore,
    pub style: StyleOptions,
    pub viewport: Viewport,
    pub selection: Option<AnnotationId>,
    pub mode: Mode,
    /// Last pointer position in canvas space, used for drawing previews.
    pub pointer: Option<crate::geometry::Point>,
    pub fonts: FontBook,
    pub export_quality: f32,
    container: Size,
    prefs: Box<dyn PreferenceStore>,
    base: Option<BaseFrame>,
    dirty: bool,
}

impl EditorState {
    pub fn new(prefs: Box<dyn PreferenceStore>) -> Self {
        let style = prefs::load_style(prefs.as_ref());
        let fonts = FontBook::load(&style.font_family);
        Self::with_fonts(prefs, fonts)
    }

    pub fn with_fonts(prefs: Box<dyn PreferenceStore>, fonts: FontBook) -> Self {
        let style = prefs::load_style(prefs.as_ref());
        let export_quality = prefs::load_export_quality(prefs.as_ref());
        Self {
            image: None,
            store: AnnotationStore::new(),
            style,
            viewport: Viewport::default(),
            selection: None,
            mode: Mode::Idle,
            pointer: None,
            fonts,
            export_quality,
            container: Size::default(),
            prefs,
            base: None,
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Swaps in a new picture. Annotations and history belong to the old one and are dropped.
    pub fn set_image(&mut self, image: EditorImage) {
        let natural = image.natural_size();
        info!(
            width = natural.width,
            height = natural.height,
            "image loaded"
        );
        self.image = Some(image);
        self.base = None;
        self.store.reset();
        self.selection = None;
        self.mode = Mode::Idle;
        self.pointer = None;
        self.viewport.reset_zoom();
        self.viewport.canvas = if self.container.is_valid() {
            fit_to_container(natural, self.container)
        } else {
            natural
        };
        self.mark_dirty();
    }

    /// Refits the canvas to a new container and carries annotations along with the image.
    pub fn set_container_size(&mut self, container: Size) {
        if !container.is_valid() || container == self.container {
            return;
        }
        self.container = container;
        let Some(image) = self.image.as_ref() else {
            return;
        };

        let old = self.viewport.canvas;
        let new = fit_to_container(image.natural_size(), container);
        if let Some((sx, sy)) = rescale_ratio(old, new) {
            self.store.rescale(sx, sy);
            self.mode.rescale_points(sx, sy);
            if let Some(pointer) = self.pointer.as_mut() {
                *pointer = pointer.scale_xy(sx, sy);
            }
        }
        self.viewport.canvas = new;
        self.mark_dirty();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.mark_dirty();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.mark_dirty();
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
        self.mark_dirty();
    }

    /// Per-annotation color override on the selection; no-op without one.
    pub fn set_line_color(&mut self, rgba: [u8; 4]) -> bool {
        self.update_selected(|annotation| annotation.line_color = Some(rgba))
    }

    pub fn set_line_style(&mut self, line_style: LineStyle) -> bool {
        self.update_selected(|annotation| annotation.line_style = Some(line_style))
    }

    fn update_selected(&mut self, apply: impl FnOnce(&mut crate::annotation::Annotation)) -> bool {
        let Some(mut annotation) = self
            .selection
            .as_deref()
            .and_then(|id| self.store.get(id))
            .cloned()
        else {
            return false;
        };
        apply(&mut annotation);
        let changed = self.store.update(annotation, Commit::Step);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        if self.style.stroke_width == width {
            return;
        }
        self.style.stroke_width = width;
        self.persist_style();
    }

    pub fn set_show_label_box(&mut self, show: bool) {
        if self.style.show_label_box == show {
            return;
        }
        self.style.show_label_box = show;
        self.persist_style();
    }

    pub fn set_font_size(&mut self, size: f32) {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        if self.style.font_size == size {
            return;
        }
        self.style.font_size = size;
        self.persist_style();
    }

    pub fn set_default_line_color(&mut self, rgba: [u8; 4]) {
        if self.style.line_color == rgba {
            return;
        }
        self.style.line_color = rgba;
        self.persist_style();
    }

    fn persist_style(&mut self) {
        if let Err(err) = prefs::save_style(self.prefs.as_mut(), &self.style) {
            warn!("cannot save style preferences: {err:#}");
        }
        self.mark_dirty();
    }

    pub fn set_export_quality(&mut self, quality: f32) {
        self.export_quality = quality.clamp(0.0, 1.0);
        if let Err(err) = prefs::save_export_quality(self.prefs.as_mut(), self.export_quality) {
            warn!("cannot save export quality: {err:#}");
        }
    }

    /// The on-screen frame at `pixels_per_point` device pixels per UI point. The scaled photo is
    /// cached, so frames that only move annotations skip resampling it.
    pub fn render_frame(&mut self, pixels_per_point: f32) -> Result<Option<Pixmap>> {
        let Some(image) = self.image.as_ref() else {
            return Ok(None);
        };
        let canvas = self.viewport.canvas;
        if !canvas.is_valid() {
            return Ok(None);
        }
        let scale = self.viewport.zoom * pixels_per_point;

        let cached = self
            .base
            .as_ref()
            .is_some_and(|base| base.canvas == canvas && base.scale == scale);
        if !cached {
            self.base = Some(BaseFrame {
                canvas,
                scale,
                pixmap: render_base(Some(&image.pixmap), canvas, scale)?,
            });
        }
        let Some(base) = self.base.as_ref() else {
            return Ok(None);
        };

        let mut frame = base.pixmap.clone();
        let preview = self.drawing_preview();
        let scene = Scene {
            annotations: self.store.annotations(),
            style: &self.style,
            selected: self.selection.as_deref(),
            preview: preview.as_ref(),
            zoom: self.viewport.zoom,
        };
        render_overlay(&mut frame, &scene, scale, &self.fonts);
        Ok(Some(frame))
    }

    /// Full-resolution flattened image, or `None` when no image is loaded.
    pub fn export_image(&self) -> Result<Option<DynamicImage>> {
        let Some(image) = self.image.as_ref() else {
            return Ok(None);
        };
        render_export(
            &image.pixmap,
            self.viewport.canvas,
            self.store.annotations(),
            &self.style,
            &self.fonts,
        )
    }

    pub fn export_file_name(&self) -> String {
        let stem = self
            .image
            .as_ref()
            .and_then(|image| image.file_stem.as_deref());
        export_file_name(stem, self.export_quality)
    }

    /// Replaces the collection with AI-suggested annotations as one undo step. A batch with no
    /// usable candidate leaves the collection alone.
    pub fn ingest_candidates(&mut self, json: &str) -> Result<IngestSummary, IngestError> {
        let canvas = self.viewport.canvas;
        let store = &mut self.store;
        let ingested = parse_candidates(json, canvas, || store.next_annotation_id())?;
        let summary = IngestSummary {
            accepted: ingested.annotations.len(),
            rejected: ingested.rejected.len(),
        };
        if summary.accepted > 0 {
            self.cancel_gesture();
            self.selection = None;
            self.store.replace_all(ingested.annotations);
            self.mark_dirty();
        }
        Ok(summary)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use image::{DynamicImage, RgbaImage};

    use super::*;
    use crate::annotation::Annotation;
    use crate::geometry::Point;
    use crate::prefs::MemoryPreferences;

    pub(crate) fn editor_with_image(width: u32, height: u32) -> EditorState {
        let mut state =
            EditorState::with_fonts(Box::new(MemoryPreferences::default()), FontBook::fallback());
        let dynamic = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            image::Rgba([240, 240, 240, 255]),
        ));
        let image = EditorImage::new(dynamic, Some("chair".to_string())).expect("editor image");
        state.set_image(image);
        state
    }

    fn add_sample(state: &mut EditorState) -> AnnotationId {
        let id = state.store.next_annotation_id();
        state.store.add(Annotation::new(
            id.clone(),
            "Width: 10",
            "10",
            Point::new(100.0, 100.0),
            Point::new(300.0, 100.0),
        ));
        id
    }

    #[test]
    fn new_image_resets_annotations_and_history() {
        let mut state = editor_with_image(400, 300);
        add_sample(&mut state);
        assert!(state.store.can_undo());

        let dynamic = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        state.set_image(EditorImage::new(dynamic, None).expect("image"));

        assert!(state.store.is_empty());
        assert!(!state.store.can_undo());
        assert_eq!(state.selection, None);
    }

    #[test]
    fn container_resize_rescales_without_history() {
        let mut state = editor_with_image(800, 400);
        state.set_container_size(Size::new(800.0, 800.0));
        assert_eq!(state.viewport.canvas, Size::new(800.0, 400.0));

        add_sample(&mut state);
        let history = state.store.history_len();
        state.set_container_size(Size::new(400.0, 400.0));

        assert_eq!(state.viewport.canvas, Size::new(400.0, 200.0));
        let annotation = &state.store.annotations()[0];
        assert_eq!(annotation.p1, Point::new(50.0, 50.0));
        assert_eq!(annotation.p2, Point::new(150.0, 50.0));
        assert_eq!(state.store.history_len(), history);
    }

    #[test]
    fn line_overrides_need_a_selection() {
        let mut state = editor_with_image(400, 300);
        let id = add_sample(&mut state);
        assert!(!state.set_line_color([255, 0, 0, 255]));

        state.selection = Some(id.clone());
        assert!(state.set_line_color([255, 0, 0, 255]));
        assert!(state.set_line_style(LineStyle::Dashed));
        let annotation = state.store.get(&id).expect("annotation");
        assert_eq!(annotation.line_color, Some([255, 0, 0, 255]));
        assert_eq!(annotation.line_style, Some(LineStyle::Dashed));

        assert!(state.store.undo());
        assert_eq!(state.store.get(&id).and_then(|a| a.line_style), None);
    }

    #[test]
    fn style_changes_are_persisted() {
        let mut state = editor_with_image(400, 300);
        state.set_stroke_width(4.0);
        state.set_show_label_box(false);

        let saved = prefs::load_style(state.prefs.as_ref());
        assert_eq!(saved.stroke_width, 4.0);
        assert!(!saved.show_label_box);
    }

    #[test]
    fn export_uses_natural_resolution_and_upload_name() {
        let mut state = editor_with_image(1600, 800);
        state.set_container_size(Size::new(800.0, 800.0));
        add_sample(&mut state);

        let exported = state.export_image().expect("export").expect("image loaded");
        assert_eq!((exported.width(), exported.height()), (1600, 800));
        assert_eq!(state.export_file_name(), "chair-annotated-q100.jpg");
    }

    #[test]
    fn export_without_image_is_a_no_op() {
        let mut state =
            EditorState::with_fonts(Box::new(MemoryPreferences::default()), FontBook::fallback());
        assert!(state.export_image().expect("export").is_none());
        assert!(state.render_frame(1.0).expect("render").is_none());
    }

    #[test]
    fn frame_size_tracks_zoom() {
        let mut state = editor_with_image(400, 200);
        state.set_container_size(Size::new(400.0, 400.0));
        state.zoom_in();
        let frame = state.render_frame(2.0).expect("render").expect("frame");
        assert_eq!((frame.width(), frame.height()), (1000, 500));
    }

    #[test]
    fn cached_photo_frame_matches_full_render() {
        let mut state = editor_with_image(400, 200);
        state.set_container_size(Size::new(400.0, 400.0));
        let id = add_sample(&mut state);
        state.selection = Some(id.clone());

        let first = state.render_frame(1.5).expect("render").expect("frame");
        assert!(state.base.as_ref().is_some_and(|base| base.scale == 1.5));

        let mut moved = state.store.get(&id).cloned().expect("annotation");
        moved.move_by(Point::new(20.0, 30.0));
        state.store.update(moved, crate::store::Commit::Step);
        let second = state.render_frame(1.5).expect("render").expect("frame");
        assert_ne!(first.data(), second.data());

        let image = state.image.as_ref().expect("image");
        let scene = Scene {
            annotations: state.store.annotations(),
            style: &state.style,
            selected: state.selection.as_deref(),
            preview: None,
            zoom: state.viewport.zoom,
        };
        let mut full = render_base(Some(&image.pixmap), state.viewport.canvas, 1.5).expect("base");
        render_overlay(&mut full, &scene, 1.5, &state.fonts);
        assert_eq!(second.data(), full.data());
    }

    #[test]
    fn zoom_change_rebuilds_cached_photo() {
        let mut state = editor_with_image(400, 200);
        state.set_container_size(Size::new(400.0, 400.0));
        state.render_frame(1.0).expect("render");
        state.zoom_in();
        let frame = state.render_frame(1.0).expect("render").expect("frame");

        assert_eq!((frame.width(), frame.height()), (500, 250));
        assert!(state.base.as_ref().is_some_and(|base| base.scale == 1.25));
    }

    #[test]
    fn ingest_replaces_collection_in_one_step() {
        let mut state = editor_with_image(400, 200);
        state.set_container_size(Size::new(400.0, 400.0));
        add_sample(&mut state);
        let history = state.store.history_len();

        let summary = state
            .ingest_candidates(
                r#"{"annotations": [
                    {"label": "Height: 30", "p1": {"x": 0.1, "y": 0.1}, "p2": {"x": 0.1, "y": 0.9}},
                    {"label": "Broken"}
                ]}"#,
            )
            .expect("ingest");

        assert_eq!(summary, IngestSummary { accepted: 1, rejected: 1 });
        assert_eq!(state.store.history_len(), history + 1);
        assert_eq!(state.store.annotations()[0].value_text, "30");
        assert!(state.store.annotations()[0].p2.distance(Point::new(40.0, 180.0)) < 1e-3);
    }
}
