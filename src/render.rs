use anyhow::{anyhow, Result};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, Canvas};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, IntSize, LineCap, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

use crate::annotation::{Annotation, PLACEHOLDER_VALUE};
use crate::fonts::FontBook;
use crate::geometry::{derive_dimension_line, Point};
use crate::style::StyleOptions;
use crate::transform::Size;

/// Handle radius in screen pixels, independent of zoom.
pub const HANDLE_RADIUS: f32 = 8.0;

const POINT_HANDLE_FILL: [u8; 4] = [255, 255, 255, 230];
const LABEL_HANDLE_FILL: [u8; 4] = [200, 255, 200, 230];
const HANDLE_OUTLINE: [u8; 4] = [51, 51, 51, 255];

const PREVIEW_COLOR: [u8; 4] = [79, 70, 229, 179];
const PREVIEW_DASH: [f32; 2] = [6.0, 4.0];
const PREVIEW_STROKE: f32 = 2.0;
const PREVIEW_POINT_RADIUS: f32 = 5.0;

const EXTENSION_WIDTH_RATIO: f32 = 0.6;
const SHADOW_COLOR: [u8; 4] = [0, 0, 0, 40];

/// In-progress three-click construction, in canvas-native units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawPreview {
    pub placed: Vec<Point>,
    pub pointer: Option<Point>,
}

/// Everything drawn over the base frame.
pub struct Scene<'a> {
    pub annotations: &'a [Annotation],
    pub style: &'a StyleOptions,
    pub selected: Option<&'a str>,
    pub preview: Option<&'a DrawPreview>,
    pub zoom: f32,
}

/// Label bounds, centered on the label position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    pub center: Point,
    pub width: f32,
    pub height: f32,
}

impl LabelBox {
    pub fn min(&self) -> Point {
        Point::new(
            self.center.x - self.width / 2.0,
            self.center.y - self.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let min = self.min();
        point.x >= min.x
            && point.x <= min.x + self.width
            && point.y >= min.y
            && point.y <= min.y + self.height
    }
}

/// Box around the rendered value: text metrics plus padding on each side, one font size tall.
pub fn label_box(annotation: &Annotation, style: &StyleOptions, fonts: &FontBook) -> LabelBox {
    let (text_w, _) = fonts.measure(&annotation.display_text(), style.font_size);
    LabelBox {
        center: annotation.label_pos,
        width: text_w + style.label_box_padding * 2.0,
        height: style.font_size + style.label_box_padding * 2.0,
    }
}

/// White frame at `scale` device pixels per canvas unit, with the photo stretched over it.
/// Depends only on canvas size and scale, so callers can keep it across frames that only
/// change annotations.
pub fn render_base(image: Option<&Pixmap>, canvas: Size, scale: f32) -> Result<Pixmap> {
    let size = canvas.scale(scale);
    let width = size.width.round().max(1.0) as u32;
    let height = size.height.round().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("cannot allocate {width}x{height} frame"))?;
    pixmap.fill(Color::WHITE);

    if let Some(image) = image {
        draw_image(&mut pixmap, image, size);
    }
    Ok(pixmap)
}

/// Annotations, selection handles and the drawing preview, on top of a base frame.
pub fn render_overlay(pixmap: &mut Pixmap, scene: &Scene<'_>, scale: f32, fonts: &FontBook) {
    let style = scene.style.scaled(scale);
    for annotation in scene.annotations {
        draw_annotation(pixmap, &annotation.scaled(scale), &style, fonts);
    }

    if let Some(selected) = scene.selected {
        if let Some(annotation) = scene.annotations.iter().find(|a| a.id == selected) {
            let pixels_per_screen_px = scale / scene.zoom.max(f32::EPSILON);
            draw_handles(pixmap, &annotation.scaled(scale), pixels_per_screen_px);
        }
    }

    if let Some(preview) = scene.preview {
        draw_preview(pixmap, preview, scene.style, scale, fonts);
    }
}

/// Draws one annotation whose points and style metrics are already in target pixels. Shared by
/// the on-screen frame and the full-resolution export.
pub fn draw_annotation(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    style: &StyleOptions,
    fonts: &FontBook,
) {
    let paint = solid_paint(annotation.line_color_or(style.line_color));
    let dash = annotation
        .line_style_or_default()
        .dash_intervals(style.stroke_width);

    let extension_stroke = make_stroke(style.stroke_width * EXTENSION_WIDTH_RATIO, dash.clone());
    for (ext, end) in [(annotation.ext1, annotation.p1), (annotation.ext2, annotation.p2)] {
        if let Some(ext) = ext {
            stroke_segment(pixmap, ext, end, &paint, &extension_stroke);
        }
    }

    let line_stroke = make_stroke(style.stroke_width, dash);
    stroke_segment(pixmap, annotation.p1, annotation.p2, &paint, &line_stroke);

    let tick_stroke = make_stroke(style.stroke_width, None);
    draw_tick(pixmap, annotation.p1, annotation.p2, style.tick_size, &paint, &tick_stroke);
    draw_tick(pixmap, annotation.p2, annotation.p1, style.tick_size, &paint, &tick_stroke);

    draw_label(pixmap, annotation, style, fonts);
}

/// Short mark across the line at `at`, perpendicular to `from -> at`.
fn draw_tick(
    pixmap: &mut Pixmap,
    at: Point,
    from: Point,
    size: f32,
    paint: &Paint<'_>,
    stroke: &Stroke,
) {
    let direction = at.sub(from);
    let len = direction.length();
    let unit = if len > f32::EPSILON {
        direction.scale(1.0 / len)
    } else {
        Point::new(1.0, 0.0)
    };
    let half = unit.perpendicular().scale(size / 2.0);
    stroke_segment(pixmap, at.sub(half), at.add(half), paint, stroke);
}

fn draw_label(
    pixmap: &mut Pixmap,
    annotation: &Annotation,
    style: &StyleOptions,
    fonts: &FontBook,
) {
    let text = annotation.display_text();
    let label = label_box(annotation, style, fonts);

    let center = if style.show_label_box {
        let min = label.min();
        let radius = style.label_box_padding.min(label.height / 2.0).max(0.0);
        let shadow_offset = style.font_size / 7.0;
        let shadow = rounded_rect(
            min.x,
            min.y + shadow_offset,
            label.width,
            label.height,
            radius,
        );
        if let Some(path) = shadow {
            pixmap.fill_path(
                &path,
                &solid_paint(SHADOW_COLOR),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        if let Some(path) = rounded_rect(min.x, min.y, label.width, label.height, radius) {
            pixmap.fill_path(
                &path,
                &solid_paint(style.label_box_color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
        annotation.label_pos
    } else {
        let lift = style.font_size * 0.75 + style.stroke_width;
        annotation
            .label_pos
            .add(upward_normal(annotation.p1, annotation.p2).scale(lift))
    };

    let Some(font) = fonts.font() else {
        return;
    };
    let (text_w, text_h) = fonts.measure(&text, style.font_size);
    let x = (center.x - text_w / 2.0).round() as i32;
    let y = (center.y - text_h / 2.0).round() as i32;
    draw_text_mut(
        &mut PixmapCanvas(pixmap),
        Rgba(style.text_color),
        x,
        y,
        style.font_size,
        font,
        &text,
    );
}

/// Unit normal of `a -> b` that points up the screen (negative y); straight up for
/// degenerate segments.
fn upward_normal(a: Point, b: Point) -> Point {
    let direction = b.sub(a);
    let len = direction.length();
    if len <= f32::EPSILON {
        return Point::new(0.0, -1.0);
    }
    let normal = direction.scale(1.0 / len).perpendicular();
    if normal.y > 0.0 {
        normal.scale(-1.0)
    } else {
        normal
    }
}

fn draw_handles(pixmap: &mut Pixmap, annotation: &Annotation, pixels_per_screen_px: f32) {
    let radius = HANDLE_RADIUS * pixels_per_screen_px;
    let outline = make_stroke(pixels_per_screen_px, None);
    for (center, fill) in [
        (annotation.p1, POINT_HANDLE_FILL),
        (annotation.p2, POINT_HANDLE_FILL),
        (annotation.label_pos, LABEL_HANDLE_FILL),
    ] {
        let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) else {
            continue;
        };
        pixmap.fill_path(
            &path,
            &solid_paint(fill),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        pixmap.stroke_path(
            &path,
            &solid_paint(HANDLE_OUTLINE),
            &outline,
            Transform::identity(),
            None,
        );
    }
}

fn draw_preview(
    pixmap: &mut Pixmap,
    preview: &DrawPreview,
    style: &StyleOptions,
    scale: f32,
    fonts: &FontBook,
) {
    let paint = solid_paint(PREVIEW_COLOR);
    let dashed = make_stroke(
        PREVIEW_STROKE * scale,
        Some(PREVIEW_DASH.iter().map(|v| v * scale).collect()),
    );

    for point in &preview.placed {
        let p = point.scale(scale);
        if let Some(path) = PathBuilder::from_circle(p.x, p.y, PREVIEW_POINT_RADIUS * scale) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    let Some(pointer) = preview.pointer else {
        return;
    };
    match preview.placed.as_slice() {
        [start] => {
            stroke_segment(pixmap, start.scale(scale), pointer.scale(scale), &paint, &dashed);
        }
        [c1, c2] => {
            let line = derive_dimension_line(*c1, *c2, pointer);
            let mut ghost = Annotation::new(String::new(), "", PLACEHOLDER_VALUE, line.p1, line.p2);
            ghost.label_pos = line.label_pos;
            ghost.ext1 = Some(*c1);
            ghost.ext2 = Some(*c2);
            draw_annotation(pixmap, &ghost.scaled(scale), &style.scaled(scale), fonts);
        }
        _ => {}
    }
}

/// Paints `image` stretched over `size` pixels from the top-left corner.
pub fn draw_image(pixmap: &mut Pixmap, image: &Pixmap, size: Size) {
    let sx = size.width / image.width() as f32;
    let sy = size.height / image.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, Transform::from_scale(sx, sy), None);
}

fn solid_paint(rgba: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = true;
    paint
}

fn make_stroke(width: f32, dash: Option<Vec<f32>>) -> Stroke {
    Stroke {
        width: width.max(0.1),
        line_cap: LineCap::Butt,
        dash: dash.and_then(|intervals| StrokeDash::new(intervals, 0.0)),
        ..Stroke::default()
    }
}

fn stroke_segment(pixmap: &mut Pixmap, from: Point, to: Point, paint: &Paint<'_>, stroke: &Stroke) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
    }
}

fn rounded_rect(x: f32, y: f32, w: f32, h: f32, r: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = r.min(w / 2.0).min(h / 2.0);
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Lets imageproc's text rasterizer blend straight into a premultiplied pixmap.
struct PixmapCanvas<'a>(&'a mut Pixmap);

impl Canvas for PixmapCanvas<'_> {
    type Pixel = Rgba<u8>;

    fn dimensions(&self) -> (u32, u32) {
        (self.0.width(), self.0.height())
    }

    fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        match self.0.pixel(x, y) {
            Some(pixel) => {
                let c = pixel.demultiply();
                Rgba([c.red(), c.green(), c.blue(), c.alpha()])
            }
            None => Rgba([0, 0, 0, 0]),
        }
    }

    fn draw_pixel(&mut self, x: u32, y: u32, color: Rgba<u8>) {
        let width = self.0.width();
        if x >= width || y >= self.0.height() {
            return;
        }
        let [r, g, b, a] = color.0;
        let index = (y * width + x) as usize;
        self.0.pixels_mut()[index] = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
}

/// Decodes into a premultiplied pixmap at the image's own resolution.
pub fn pixmap_from_image(image: &DynamicImage) -> Result<Pixmap> {
    let rgba = image.to_rgba8();
    let size = IntSize::from_wh(rgba.width(), rgba.height())
        .ok_or_else(|| anyhow!("image has no pixels"))?;
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let premultiplied = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
        px[0] = premultiplied.red();
        px[1] = premultiplied.green();
        px[2] = premultiplied.blue();
    }
    Pixmap::from_vec(data, size).ok_or_else(|| anyhow!("cannot build pixmap from image"))
}

pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| anyhow!("cannot construct output image"))
}
