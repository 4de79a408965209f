// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture geometry.

use kurbo::Point;

/// A range of movement directions, in degrees.
///
/// Angles are measured from the start point to the current point with
/// `atan2` and shifted into `[0, 360]`: 0 and 360 point left, 90 up, 180
/// right and 270 down (client coordinates, y growing downward). Missing bounds
/// are open.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AngleRange {
    /// Lower bound, inclusive.
    pub start: Option<f64>,
    /// Upper bound, inclusive.
    pub end: Option<f64>,
}

impl AngleRange {
    /// A closed range.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether `angle` lies in the range.
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        self.start.is_none_or(|start| angle >= start) && self.end.is_none_or(|end| angle <= end)
    }
}

/// Direction of the movement from `from` to `to`, in `[0, 360]` degrees.
#[must_use]
pub fn movement_angle(from: Point, to: Point) -> f64 {
    (to - from).atan2().to_degrees() + 180.0
}

/// Whether the movement from `from` to `to` falls in any of `ranges`.
#[must_use]
pub fn in_angle_ranges(from: Point, to: Point, ranges: &[AngleRange]) -> bool {
    if ranges.is_empty() {
        return false;
    }
    let angle = movement_angle(from, to);
    ranges.iter().any(|range| range.contains(angle))
}
