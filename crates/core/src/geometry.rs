//! Geometry primitives shared by the measurement engine
//!
//! All coordinates live in a single document space (millimeters or whatever
//! user unit the host drawing establishes). Y grows downward, as in SVG.

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

/// A point in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Arithmetic mean of two points
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub(crate) fn to_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub(crate) fn from_vec(v: DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

/// 2D affine transform
///
/// Coefficients follow the SVG `matrix(a b c d e f)` order:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// Serialized as the six-element array `[a, b, c, d, e, f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Transform(DAffine2);

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform(DAffine2::IDENTITY);

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Build from SVG matrix coefficients
    pub fn from_coefficients(coefficients: [f64; 6]) -> Self {
        Self(DAffine2::from_cols_array(&coefficients))
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self(DAffine2::from_translation(DVec2::new(tx, ty)))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self(DAffine2::from_scale(DVec2::new(sx, sy)))
    }

    /// Rotation about the origin, positive angles turn +x toward +y
    pub fn rotate_degrees(degrees: f64) -> Self {
        Self(DAffine2::from_angle(degrees.to_radians()))
    }

    /// Compose two transforms: the result applies `inner` first, then `outer`
    pub fn compose(outer: &Transform, inner: &Transform) -> Transform {
        Transform(outer.0 * inner.0)
    }

    /// Map a point through this transform
    pub fn apply(&self, point: Point) -> Point {
        Point::from_vec(self.0.transform_point2(point.to_vec()))
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.0.to_cols_array()
    }

    pub fn is_identity(&self) -> bool {
        self.0 == DAffine2::IDENTITY
    }
}

impl From<[f64; 6]> for Transform {
    fn from(coefficients: [f64; 6]) -> Self {
        Self::from_coefficients(coefficients)
    }
}

impl From<Transform> for [f64; 6] {
    fn from(transform: Transform) -> Self {
        transform.coefficients()
    }
}

/// Axis-aligned box with `left <= right` and `top <= bottom`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    /// Create a box, reordering the edges if they were given inverted
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// Box spanned by two points; only the two extrema are considered
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn longest_side(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right, self.top),
            Point::new(self.right, self.bottom),
            Point::new(self.left, self.bottom),
        ]
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Axis-aligned box of the four transformed corners
    pub fn transformed(&self, transform: &Transform) -> BoundingBox {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for corner in self.corners() {
            let p = transform.apply(corner).to_vec();
            min = min.min(p);
            max = max.max(p);
        }
        BoundingBox {
            left: min.x,
            top: min.y,
            right: max.x,
            bottom: max.y,
        }
    }
}

/// Straight line between two points; zero length is a valid state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn dx(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn dy(&self) -> f64 {
        self.end.y - self.start.y
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn midpoint(&self) -> Point {
        self.start.midpoint(&self.end)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.start, self.end)
    }

    /// True when this segment points against `original`
    ///
    /// Happens when marker clearance exceeds half the original length and the
    /// shortened endpoints cross over.
    pub fn is_reversed_by(&self, original: &Segment) -> bool {
        self.dx() * original.dx() + self.dy() * original.dy() < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_eq(actual: Point, expected: Point) {
        assert!(
            actual.distance_to(&expected) < 1e-9,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_point_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
        assert_eq!(a.midpoint(&b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_compose_applies_inner_first() {
        let scale = Transform::scale(2.0, 2.0);
        let translate = Transform::translate(10.0, 0.0);

        // scale then translate
        let composed = Transform::compose(&translate, &scale);
        assert_point_eq(composed.apply(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

        // translate then scale
        let composed = Transform::compose(&scale, &translate);
        assert_point_eq(composed.apply(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
    }

    #[test]
    fn test_identity_is_neutral() {
        let t = Transform::from_coefficients([1.0, 0.5, -0.5, 1.0, 3.0, 4.0]);
        assert_eq!(Transform::compose(&Transform::IDENTITY, &t), t);
        assert_eq!(Transform::compose(&t, &Transform::IDENTITY), t);
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_coefficients_follow_svg_matrix_order() {
        let t = Transform::from_coefficients([1.0, 0.0, 0.0, 1.0, 5.0, 7.0]);
        assert_point_eq(t.apply(Point::new(0.0, 0.0)), Point::new(5.0, 7.0));
        assert_eq!(t.coefficients(), [1.0, 0.0, 0.0, 1.0, 5.0, 7.0]);
    }

    #[test]
    fn test_rotation_turns_x_toward_y() {
        let t = Transform::rotate_degrees(90.0);
        assert_point_eq(t.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0));
    }

    #[test]
    fn test_transform_serializes_as_array() {
        let t = Transform::translate(2.0, 3.0);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "[1.0,0.0,0.0,1.0,2.0,3.0]");
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_bounding_box_from_points_orders_edges() {
        let bbox = BoundingBox::from_points(Point::new(10.0, -2.0), Point::new(4.0, 6.0));
        assert_eq!(bbox, BoundingBox::new(4.0, -2.0, 10.0, 6.0));
        assert_eq!(bbox.width(), 6.0);
        assert_eq!(bbox.height(), 8.0);
        assert_eq!(bbox.longest_side(), 8.0);
        assert_eq!(bbox.center(), Point::new(7.0, 2.0));
    }

    #[test]
    fn test_transformed_box_of_rotated_square() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let rotated = bbox.transformed(&Transform::rotate_degrees(45.0));
        let half_diagonal = 2.0_f64.sqrt();
        assert!((rotated.width() - 2.0 * half_diagonal).abs() < 1e-9);
        assert_point_eq(rotated.center(), Point::new(0.0, half_diagonal));
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(-1.0, 0.5, 0.5, 3.0);
        assert_eq!(a.union(&b), BoundingBox::new(-1.0, 0.0, 1.0, 3.0));
    }

    #[test]
    fn test_segment_reversal_detection() {
        let original = Segment::new(Point::new(0.0, 0.0), Point::new(4.0, 0.0));
        let crossed = Segment::new(Point::new(3.0, 0.0), Point::new(1.0, 0.0));
        assert!(crossed.is_reversed_by(&original));
        assert!(!original.is_reversed_by(&original));
    }
}
