//! Measurement label placement
//!
//! The label sits at the midpoint of the measured segment, raised off the line
//! along its normal, and rotated to follow the line. Segments pointing left are
//! flipped by half a turn so the text never renders upside down.

use crate::geometry::{Point, Segment};
use crate::segment::segment_angle_degrees;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Position, orientation and content of a measurement label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPlacement {
    pub text: String,
    pub anchor: Point,
    /// Rotation about `anchor`, in `[-90, 90]`
    pub rotation_degrees: f64,
}

/// Raw angles in `(90, 180]` or `[-180, -90)` point leftward
pub fn is_leftward(angle_degrees: f64) -> bool {
    (angle_degrees > 90.0 && angle_degrees <= 180.0)
        || (angle_degrees < -90.0 && angle_degrees >= -180.0)
}

/// Wrap an angle into `(-180, 180]`
pub fn wrap_degrees(angle_degrees: f64) -> f64 {
    let wrapped = angle_degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Readable text rotation for a raw segment angle
pub fn normalize_rotation(raw_degrees: f64) -> f64 {
    if is_leftward(raw_degrees) {
        wrap_degrees(raw_degrees + 180.0)
    } else {
        raw_degrees
    }
}

/// Label text: two decimals, a space, then the unit
pub fn format_length(value: f64, unit: &str) -> String {
    // keep "-0.00" out of labels
    let value = if (value * 100.0).round() == 0.0 {
        0.0
    } else {
        value
    };
    format!("{value:.2} {unit}")
}

/// Place the label for the original (non-offset) segment `start`→`end`
pub fn place(start: Point, end: Point, scaled_length: f64, text_raise: f64, unit: &str) -> LabelPlacement {
    let midpoint = Segment::new(start, end).midpoint();
    let rotation = normalize_rotation(segment_angle_degrees(start, end));

    // the normal at -90° from the (flipped) direction is "above" the text
    let normal = rotation.to_radians() - FRAC_PI_2;
    let anchor = Point::new(
        midpoint.x + text_raise * normal.cos(),
        midpoint.y + text_raise * normal.sin(),
    );

    LabelPlacement {
        text: format_length(scaled_length, unit),
        anchor,
        rotation_degrees: rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_same_angle(actual: f64, expected: f64) {
        let diff = (actual - expected).rem_euclid(360.0);
        assert!(
            diff < EPS || 360.0 - diff < EPS,
            "expected {expected} (mod 360), got {actual}"
        );
    }

    #[test]
    fn test_label_text_formatting() {
        assert_eq!(format_length(3.4, "m"), "3.40 m");
        assert_eq!(format_length(0.0, "m"), "0.00 m");
        assert_eq!(format_length(1.005_1, "m"), "1.01 m");
        assert_eq!(format_length(12.0, "ft"), "12.00 ft");
    }

    #[test]
    fn test_negative_zero_is_not_printed() {
        assert_eq!(format_length(-0.0, "m"), "0.00 m");
        assert_eq!(format_length(-0.001, "m"), "0.00 m");
        assert_eq!(format_length(-2.5, "m"), "-2.50 m");
    }

    #[test]
    fn test_rightward_label() {
        let label = place(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 1.0, 5.0, "m");
        assert_eq!(label.text, "1.00 m");
        assert_close(label.rotation_degrees, 0.0);
        assert_close(label.anchor.x, 50.0);
        assert_close(label.anchor.y, -5.0);
    }

    #[test]
    fn test_leftward_label_is_flipped_to_the_same_side() {
        let label = place(Point::new(100.0, 0.0), Point::new(0.0, 0.0), 1.0, 5.0, "m");
        assert_close(label.rotation_degrees, 0.0);
        assert_close(label.anchor.x, 50.0);
        assert_close(label.anchor.y, -5.0);
    }

    #[test]
    fn test_vertical_segments_are_not_flipped() {
        let down = place(Point::new(0.0, 0.0), Point::new(0.0, 10.0), 1.0, 2.0, "m");
        assert_close(down.rotation_degrees, 90.0);
        assert_close(down.anchor.x, 2.0);
        assert_close(down.anchor.y, 5.0);

        let up = place(Point::new(0.0, 10.0), Point::new(0.0, 0.0), 1.0, 2.0, "m");
        assert_close(up.rotation_degrees, -90.0);
        assert_close(up.anchor.x, -2.0);
        assert_close(up.anchor.y, 5.0);
    }

    #[test]
    fn test_rotation_matches_raw_or_flipped_angle() {
        let start = Point::new(10.0, -4.0);
        for step in 0..72 {
            let theta = (step as f64 * 5.0 + 0.5).to_radians();
            let end = Point::new(start.x + 20.0 * theta.cos(), start.y + 20.0 * theta.sin());
            let raw = segment_angle_degrees(start, end);
            let label = place(start, end, 0.0, 5.0, "m");

            if end.x < start.x {
                assert_same_angle(label.rotation_degrees, raw + 180.0);
            } else {
                assert_close(label.rotation_degrees, raw);
            }
            assert!(label.rotation_degrees.to_radians().cos() >= -EPS);
            assert!((-90.0..=90.0).contains(&label.rotation_degrees));
        }
    }

    #[test]
    fn test_anchor_is_text_raise_from_midpoint() {
        let start = Point::new(-3.0, 7.0);
        let end = Point::new(-30.0, 40.0);
        let label = place(start, end, 0.0, 6.0, "m");
        assert_close(label.anchor.distance_to(&start.midpoint(&end)), 6.0);
    }

    #[test]
    fn test_leftward_boundaries() {
        assert!(is_leftward(180.0));
        assert!(is_leftward(-180.0));
        assert!(is_leftward(90.5));
        assert!(!is_leftward(90.0));
        assert!(!is_leftward(-90.0));
        assert!(!is_leftward(0.0));
    }

    #[test]
    fn test_wrap_degrees() {
        assert_close(wrap_degrees(360.0), 0.0);
        assert_close(wrap_degrees(315.0), -45.0);
        assert_close(wrap_degrees(180.0), 180.0);
        assert_close(wrap_degrees(-180.0), 180.0);
    }
}
