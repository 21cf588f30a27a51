//! Line geometry between two measured points
//!
//! Arrowhead markers are drawn centered on the path ends and grow with the
//! stroke width. The visible line is therefore shortened at both ends so the
//! arrow tips land on the measured points instead of overshooting them.

use crate::geometry::{Point, Segment};
use crate::marker::MARKER_BASE_LENGTH;
use serde::{Deserialize, Serialize};

/// How the distance between two centers is measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LengthMetric {
    /// Straight-line distance
    #[default]
    Euclidean,
    /// Longest side of the box spanned by the two points
    LongestSide,
}

/// Fraction of the segment vector removed at each end
///
/// Zero for a zero-length segment.
pub fn clearance_fraction(length: f64, stroke_width: f64) -> f64 {
    if length == 0.0 {
        return 0.0;
    }
    MARKER_BASE_LENGTH * stroke_width / 2.0 / length
}

/// Shorten both ends of `start`→`end` to leave room for the arrowheads
///
/// Direction is preserved. Coinciding endpoints come back untouched.
pub fn offset_segment(start: Point, end: Point, stroke_width: f64) -> Segment {
    let raw = Segment::new(start, end);
    let length = raw.length();
    if length == 0.0 {
        return raw;
    }

    let fraction = clearance_fraction(length, stroke_width);
    let offset_x = raw.dx() * fraction;
    let offset_y = raw.dy() * fraction;
    Segment::new(
        Point::new(start.x + offset_x, start.y + offset_y),
        Point::new(end.x - offset_x, end.y - offset_y),
    )
}

/// Orientation of `start`→`end` in degrees, in `[-180, 180]`
pub fn segment_angle_degrees(start: Point, end: Point) -> f64 {
    (end.y - start.y).atan2(end.x - start.x).to_degrees()
}

/// Unscaled length of a measured segment
pub fn measured_length(segment: &Segment, metric: LengthMetric) -> f64 {
    match metric {
        LengthMetric::Euclidean => segment.length(),
        LengthMetric::LongestSide => segment.bounding_box().longest_side(),
    }
}
