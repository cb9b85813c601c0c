use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Below this length the construction direction is treated as undefined.
const DIRECTION_EPSILON: f32 = 1e-6;

pub const DEFAULT_SNAP_STEP_DEGREES: f32 = 15.0;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_pos2(self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn from_pos2(value: Pos2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn scale_xy(self, sx: f32, sy: f32) -> Point {
        Point::new(self.x * sx, self.y * sy)
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f32 {
        self.sub(other).length()
    }

    /// Counter-clockwise normal `(-y, x)`, not normalized.
    pub fn perpendicular(self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Result of the three-click construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DimensionLine {
    pub p1: Point,
    pub p2: Point,
    pub label_pos: Point,
}

/// Builds the dimension line for a measured edge `c1 -> c2`, pushed sideways by the signed
/// distance of `c3` from that edge. When `c1` and `c2` coincide there is no direction to offset
/// along, so the raw points come back untouched with the label at `c3`.
pub fn derive_dimension_line(c1: Point, c2: Point, c3: Point) -> DimensionLine {
    let normal = c2.sub(c1).perpendicular();
    let normal_len = normal.length();

    if normal_len < DIRECTION_EPSILON {
        return DimensionLine {
            p1: c1,
            p2: c2,
            label_pos: c3,
        };
    }

    let unit_normal = normal.scale(1.0 / normal_len);
    let offset_distance = c3.sub(c1).dot(unit_normal);
    let offset = unit_normal.scale(offset_distance);

    let p1 = c1.add(offset);
    let p2 = c2.add(offset);
    DimensionLine {
        p1,
        p2,
        label_pos: midpoint(p1, p2),
    }
}

/// Clamped projection distance. Callers must skip zero-length segments first.
pub fn point_to_segment_distance(point: Point, a: Point, b: Point) -> f32 {
    let ab = b.sub(a);
    let t = (point.sub(a).dot(ab) / ab.length_sq()).clamp(0.0, 1.0);
    point.distance(a.add(ab.scale(t)))
}

pub fn point_in_circle(point: Point, center: Point, radius: f32) -> bool {
    point.distance(center) <= radius
}

/// Keeps the distance from `anchor` and rounds the direction to the nearest multiple of
/// `step_degrees`.
pub fn snap_to_angle(point: Point, anchor: Point, step_degrees: f32) -> Point {
    let delta = point.sub(anchor);
    let distance = delta.length();
    if distance <= f32::EPSILON || step_degrees <= 0.0 {
        return point;
    }

    let step = step_degrees.to_radians();
    let angle = delta.y.atan2(delta.x);
    let snapped = (angle / step).round() * step;
    Point::new(
        anchor.x + distance * snapped.cos(),
        anchor.y + distance * snapped.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!(
            a.distance(b) < 1e-3,
            "expected {b:?}, got {a:?} (distance {})",
            a.distance(b)
        );
    }

    #[test]
    fn three_click_construction_offsets_horizontal_edge() {
        let line = derive_dimension_line(
            Point::new(100.0, 100.0),
            Point::new(300.0, 100.0),
            Point::new(200.0, 150.0),
        );

        assert_close(line.p1, Point::new(100.0, 150.0));
        assert_close(line.p2, Point::new(300.0, 150.0));
        assert_close(line.label_pos, Point::new(200.0, 150.0));
    }

    #[test]
    fn derived_line_is_parallel_with_centered_label() {
        let cases = [
            (
                Point::new(10.0, 20.0),
                Point::new(80.0, 95.0),
                Point::new(-40.0, 60.0),
            ),
            (
                Point::new(300.0, 40.0),
                Point::new(120.0, 210.0),
                Point::new(400.0, 400.0),
            ),
            (
                Point::new(0.0, 0.0),
                Point::new(0.0, 50.0),
                Point::new(-25.0, 10.0),
            ),
        ];

        for (c1, c2, c3) in cases {
            let line = derive_dimension_line(c1, c2, c3);
            let measured = c2.sub(c1);
            let derived = line.p2.sub(line.p1);
            let cross = measured.cross(derived) / (measured.length() * derived.length());
            assert!(cross.abs() < 1e-4, "not parallel: {cross}");
            assert_close(line.label_pos, midpoint(line.p1, line.p2));
        }
    }

    #[test]
    fn vertical_edge_offsets_toward_third_click() {
        let line = derive_dimension_line(
            Point::new(50.0, 0.0),
            Point::new(50.0, 100.0),
            Point::new(20.0, 70.0),
        );

        assert_close(line.p1, Point::new(20.0, 0.0));
        assert_close(line.p2, Point::new(20.0, 100.0));
    }

    #[test]
    fn coincident_points_fall_back_to_raw_input() {
        let c = Point::new(42.0, 17.0);
        let c3 = Point::new(90.0, -5.0);
        let line = derive_dimension_line(c, c, c3);

        assert_eq!(line.p1, c);
        assert_eq!(line.p2, c);
        assert_eq!(line.label_pos, c3);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(100.0, 0.0);

        assert!((point_to_segment_distance(Point::new(50.0, 4.0), a, b) - 4.0).abs() < 1e-5);
        assert!((point_to_segment_distance(Point::new(-3.0, 4.0), a, b) - 5.0).abs() < 1e-5);
        assert!((point_to_segment_distance(Point::new(106.0, 8.0), a, b) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn circle_hit_includes_boundary() {
        let center = Point::new(10.0, 10.0);
        assert!(point_in_circle(Point::new(18.0, 10.0), center, 8.0));
        assert!(!point_in_circle(Point::new(18.5, 10.0), center, 8.0));
    }

    #[test]
    fn snap_rounds_to_fifteen_degree_steps_and_keeps_distance() {
        let anchor = Point::new(10.0, 10.0);
        let angle = 37.0_f32.to_radians();
        let point = Point::new(10.0 + 50.0 * angle.cos(), 10.0 + 50.0 * angle.sin());

        let snapped = snap_to_angle(point, anchor, DEFAULT_SNAP_STEP_DEGREES);
        let expected = 30.0_f32.to_radians();

        assert!((snapped.distance(anchor) - 50.0).abs() < 1e-3);
        assert_close(
            snapped,
            Point::new(10.0 + 50.0 * expected.cos(), 10.0 + 50.0 * expected.sin()),
        );
    }

    #[test]
    fn snap_near_horizontal_flattens_line() {
        let snapped = snap_to_angle(
            Point::new(100.0, 3.0),
            Point::ZERO,
            DEFAULT_SNAP_STEP_DEGREES,
        );
        assert!(snapped.y.abs() < 1e-3);
        assert!((snapped.x - 100.0_f32.hypot(3.0)).abs() < 1e-3);
    }

    #[test]
    fn snap_at_anchor_is_identity() {
        let anchor = Point::new(5.0, 5.0);
        assert_eq!(snap_to_angle(anchor, anchor, 15.0), anchor);
    }
}
