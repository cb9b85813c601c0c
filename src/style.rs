use serde::{Deserialize, Serialize};

/// Global look of every annotation. Per-annotation `line_color`/`line_style` override the
/// line settings here.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleOptions {
    pub stroke_width: f32,
    /// Length of the perpendicular end ticks.
    #[serde(alias = "arrowheadSize")]
    pub tick_size: f32,
    pub line_color: [u8; 4],
    pub font_family: String,
    pub font_size: f32,
    pub text_color: [u8; 4],
    pub show_label_box: bool,
    pub label_box_padding: f32,
    pub label_box_color: [u8; 4],
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            stroke_width: 2.0,
            tick_size: 14.0,
            line_color: [17, 24, 39, 217],
            font_family: "Inter, Arial, sans-serif".to_string(),
            font_size: 14.0,
            text_color: [17, 24, 39, 255],
            show_label_box: true,
            label_box_padding: 8.0,
            label_box_color: [255, 255, 255, 230],
        }
    }
}

impl StyleOptions {
    pub const STROKE_PRESETS: [f32; 3] = [1.0, 2.0, 4.0];

    /// Copy with every size metric multiplied by `factor`; colors and flags unchanged.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            stroke_width: self.stroke_width * factor,
            tick_size: self.tick_size * factor,
            font_size: self.font_size * factor,
            label_box_padding: self.label_box_padding * factor,
            ..self.clone()
        }
    }
}
