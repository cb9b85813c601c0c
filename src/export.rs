use anyhow::{anyhow, Context, Result};
use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tiny_skia::{Color, Pixmap};

use crate::annotation::Annotation;
use crate::fonts::FontBook;
use crate::render::{draw_annotation, draw_image, pixmap_to_rgba};
use crate::style::StyleOptions;
use crate::transform::{export_scale, Size};

/// Flattens the annotations onto the image at its natural resolution. Geometry and style are
/// carried from canvas-native space by `natural width / canvas width`; handles and drawing
/// previews never appear. Returns `None` when there is no usable canvas to scale from.
pub fn render_export(
    image: &Pixmap,
    canvas: Size,
    annotations: &[Annotation],
    style: &StyleOptions,
    fonts: &FontBook,
) -> Result<Option<DynamicImage>> {
    let natural = Size::new(image.width() as f32, image.height() as f32);
    let Some(scale) = export_scale(natural, canvas) else {
        return Ok(None);
    };

    let mut pixmap = Pixmap::new(image.width(), image.height())
        .ok_or_else(|| anyhow!("cannot allocate export pixmap"))?;
    pixmap.fill(Color::WHITE);
    draw_image(&mut pixmap, image, natural);

    let style = style.scaled(scale);
    for annotation in annotations {
        draw_annotation(&mut pixmap, &annotation.scaled(scale), &style, fonts);
    }

    let output = pixmap_to_rgba(&pixmap)?;
    Ok(Some(DynamicImage::ImageRgba8(output)))
}

/// Maps a 0.0–1.0 quality onto the encoder's 1–100 scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

pub fn encode_jpeg(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
    encoder.encode_image(&rgb).context("cannot encode JPEG")?;
    Ok(buffer)
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("cannot encode PNG")?;
    Ok(buffer.into_inner())
}

/// `<stem>-annotated-q<NN>.jpg`; a timestamped stem stands in when the upload had no name.
pub fn export_file_name(stem: Option<&str>, quality: f32) -> String {
    let stem = match stem.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stem) => stem.to_string(),
        None => format!("dimmark-{}", Local::now().format("%Y%m%d-%H%M%S")),
    };
    format!("{stem}-annotated-q{:02}.jpg", jpeg_quality(quality))
}
