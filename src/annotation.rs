use serde::{Deserialize, Serialize};

use crate::geometry::{midpoint, snap_to_angle, Point, DEFAULT_SNAP_STEP_DEGREES};

pub type AnnotationId = String;

pub const NEW_DIMENSION_LABEL: &str = "New Dimension";
pub const PLACEHOLDER_VALUE: &str = "??";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    pub const ALL: [LineStyle; 3] = [LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted];

    /// Dash intervals for a given stroke width; `None` means a continuous stroke.
    pub fn dash_intervals(self, stroke_width: f32) -> Option<Vec<f32>> {
        let w = stroke_width.max(0.5);
        match self {
            Self::Solid => None,
            Self::Dashed => Some(vec![w * 4.0, w * 3.0]),
            Self::Dotted => Some(vec![w, w * 2.0]),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Dashed => "Dashed",
            Self::Dotted => "Dotted",
        }
    }
}

/// Which part of an annotation a pointer grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPart {
    P1,
    P2,
    Label,
    Line,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// Source text such as `Overall Height: 34.5`.
    pub label: String,
    /// Rendered with a trailing inch mark, stored without it.
    pub value_text: String,
    pub p1: Point,
    pub p2: Point,
    pub label_pos: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext1: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext2: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<[u8; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
}

impl Annotation {
    pub fn new(
        id: AnnotationId,
        label: impl Into<String>,
        value_text: impl Into<String>,
        p1: Point,
        p2: Point,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            value_text: value_text.into(),
            p1,
            p2,
            label_pos: midpoint(p1, p2),
            ext1: None,
            ext2: None,
            line_color: None,
            line_style: None,
        }
    }

    pub fn display_text(&self) -> String {
        format!("{}\"", self.value_text)
    }

    pub fn line_color_or(&self, fallback: [u8; 4]) -> [u8; 4] {
        self.line_color.unwrap_or(fallback)
    }

    pub fn line_style_or_default(&self) -> LineStyle {
        self.line_style.unwrap_or_default()
    }

    pub fn has_length(&self) -> bool {
        self.p2.sub(self.p1).length_sq() > 0.0
    }

    pub fn move_by(&mut self, delta: Point) {
        self.p1 = self.p1.add(delta);
        self.p2 = self.p2.add(delta);
        self.label_pos = self.label_pos.add(delta);
        if let Some(ext) = self.ext1.as_mut() {
            *ext = ext.add(delta);
        }
        if let Some(ext) = self.ext2.as_mut() {
            *ext = ext.add(delta);
        }
    }

    /// Per-axis scale of every stored point.
    pub fn scale_points(&mut self, sx: f32, sy: f32) {
        self.p1 = self.p1.scale_xy(sx, sy);
        self.p2 = self.p2.scale_xy(sx, sy);
        self.label_pos = self.label_pos.scale_xy(sx, sy);
        self.ext1 = self.ext1.map(|p| p.scale_xy(sx, sy));
        self.ext2 = self.ext2.map(|p| p.scale_xy(sx, sy));
    }

    pub fn scaled(&self, factor: f32) -> Self {
        let mut copy = self.clone();
        copy.scale_points(factor, factor);
        copy
    }

    /// Applies a drag of `delta` to `self` taken as the drag-start state. Endpoint drags
    /// re-center the label.
    pub fn dragged(&self, part: DragPart, delta: Point, snap: bool) -> Self {
        let mut next = self.clone();
        match part {
            DragPart::Line => next.move_by(delta),
            DragPart::P1 => {
                let mut moved = self.p1.add(delta);
                if snap {
                    moved = snap_to_angle(moved, self.p2, DEFAULT_SNAP_STEP_DEGREES);
                }
                next.p1 = moved;
                next.label_pos = midpoint(next.p1, next.p2);
            }
            DragPart::P2 => {
                let mut moved = self.p2.add(delta);
                if snap {
                    moved = snap_to_angle(moved, self.p1, DEFAULT_SNAP_STEP_DEGREES);
                }
                next.p2 = moved;
                next.label_pos = midpoint(next.p1, next.p2);
            }
            DragPart::Label => next.label_pos = self.label_pos.add(delta),
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::{Annotation, DragPart, LineStyle};
    use crate::geometry::Point;

    fn sample() -> Annotation {
        let mut annotation = Annotation::new(
            "ann-1".to_string(),
            "Width: 20",
            "20",
            Point::new(10.0, 10.0),
            Point::new(110.0, 10.0),
        );
        annotation.ext1 = Some(Point::new(10.0, 40.0));
        annotation.ext2 = Some(Point::new(110.0, 40.0));
        annotation.label_pos = Point::new(70.0, -5.0);
        annotation
    }

    #[test]
    fn endpoint_drag_recenters_label_and_keeps_other_end() {
        let original = sample();
        let moved = original.dragged(DragPart::P1, Point::new(-10.0, 20.0), false);

        assert_eq!(moved.p1, Point::new(0.0, 30.0));
        assert_eq!(moved.p2, original.p2);
        assert_eq!(moved.label_pos, Point::new(55.0, 20.0));
        assert_eq!(moved.ext1, original.ext1);
    }

    #[test]
    fn line_drag_moves_extension_points_rigidly() {
        let original = sample();
        let moved = original.dragged(DragPart::Line, Point::new(5.0, -5.0), false);

        assert_eq!(moved.p1, Point::new(15.0, 5.0));
        assert_eq!(moved.p2, Point::new(115.0, 5.0));
        assert_eq!(moved.label_pos, Point::new(75.0, -10.0));
        assert_eq!(moved.ext1, Some(Point::new(15.0, 35.0)));
        assert_eq!(moved.ext2, Some(Point::new(115.0, 35.0)));
    }

    #[test]
    fn label_drag_only_moves_label() {
        let original = sample();
        let moved = original.dragged(DragPart::Label, Point::new(3.0, 4.0), false);

        assert_eq!(moved.p1, original.p1);
        assert_eq!(moved.p2, original.p2);
        assert_eq!(moved.label_pos, Point::new(73.0, -1.0));
    }

    #[test]
    fn snapped_endpoint_drag_pivots_around_other_end() {
        let original = sample();
        let moved = original.dragged(DragPart::P2, Point::new(0.0, 4.0), true);

        assert!((moved.p2.y - 10.0).abs() < 1e-3);
        assert!((moved.p2.distance(original.p1) - 100.0_f32.hypot(4.0)).abs() < 1e-3);
    }

    #[test]
    fn display_text_appends_inch_mark() {
        assert_eq!(sample().display_text(), "20\"");
    }

    #[test]
    fn serializes_with_camel_case_and_optional_fields() {
        let mut annotation = sample();
        annotation.line_style = Some(LineStyle::Dotted);
        let json = serde_json::to_value(&annotation).expect("serialize annotation");

        assert_eq!(json["valueText"], "20");
        assert_eq!(json["lineStyle"], "dotted");
        assert!(json.get("lineColor").is_none());

        let back: Annotation = serde_json::from_value(json).expect("deserialize annotation");
        assert_eq!(back, annotation);
    }
}
