use crate::geometry::Point;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 3.0;
pub const ZOOM_STEP: f32 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn scale(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Largest size with the image's aspect ratio that fits inside `container`.
pub fn fit_to_container(image: Size, container: Size) -> Size {
    if !image.is_valid() || !container.is_valid() {
        return Size::default();
    }
    let scale = (container.width / image.width).min(container.height / image.height);
    image.scale(scale)
}

/// Per-axis ratio to carry annotations from `old` to `new`, when both are usable and differ.
pub fn rescale_ratio(old: Size, new: Size) -> Option<(f32, f32)> {
    if !old.is_valid() || !new.is_valid() || old == new {
        return None;
    }
    Some((new.width / old.width, new.height / old.height))
}

/// Uniform factor from canvas-native to original-image pixels. Width alone decides it; the
/// canvas always carries the image's aspect ratio.
pub fn export_scale(natural: Size, canvas: Size) -> Option<f32> {
    if !natural.is_valid() || !canvas.is_valid() {
        return None;
    }
    Some(natural.width / canvas.width)
}

/// Maps between pointer coordinates and canvas-native space (the fitted, unzoomed image size
/// annotations are stored in).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// On-screen position of the canvas' top-left corner.
    pub origin: Point,
    pub zoom: f32,
    pub canvas: Size,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            zoom: 1.0,
            canvas: Size::default(),
        }
    }
}

impl Viewport {
    pub fn screen_to_canvas(&self, screen: Point) -> Point {
        screen.sub(self.origin).scale(1.0 / self.zoom)
    }

    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        canvas.scale(self.zoom).add(self.origin)
    }

    /// Converts a screen-space distance (handle radius, hit slop) into canvas units.
    pub fn screen_distance(&self, pixels: f32) -> f32 {
        pixels / self.zoom
    }

    pub fn zoomed_size(&self) -> Size {
        self.canvas.scale(self.zoom)
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = ((zoom * 100.0).round() / 100.0).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom < MAX_ZOOM
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom > MIN_ZOOM
    }
}
