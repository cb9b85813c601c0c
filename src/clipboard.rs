use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use arboard::Clipboard;
use image::{DynamicImage, RgbaImage};

/// Image currently on the system clipboard, if any.
pub fn read_image_from_clipboard() -> Result<Option<DynamicImage>> {
    let mut clipboard = Clipboard::new().context("cannot initialize clipboard")?;
    let image = match clipboard.get_image() {
        Ok(data) => data,
        Err(_) => return Ok(None),
    };

    let width = image.width as u32;
    let height = image.height as u32;
    let rgba = RgbaImage::from_raw(width, height, image.bytes.into_owned())
        .ok_or_else(|| anyhow!("clipboard image has invalid shape"))?;
    Ok(Some(DynamicImage::ImageRgba8(rgba)))
}

pub fn write_image_to_clipboard(image: &DynamicImage) -> Result<()> {
    let mut clipboard = Clipboard::new().context("cannot initialize clipboard")?;
    let rgba = image.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    clipboard
        .set_image(arboard::ImageData {
            width,
            height,
            bytes: Cow::Owned(rgba.into_raw()),
        })
        .context("cannot write image to clipboard")
}
