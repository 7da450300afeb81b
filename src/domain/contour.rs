//! Editable contour types
//!
//! All contour points are stored in image pixel coordinates.

use super::geometry::{Point, point_in_polygon};

/// Regularization family a class label belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeClass {
    /// Boxy detections may be snapped to their bounding rectangle
    Window,
    /// Open polyline, drawn as a line and never filled
    Trim,
    /// Coarse polygon with near-duplicate vertices removed
    Roof,
    /// Doors and any unrecognized class
    Other,
}

impl ShapeClass {
    /// Classify a detector label (case-insensitive)
    pub fn of(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "window" => ShapeClass::Window,
            "trim" => ShapeClass::Trim,
            "roof" => ShapeClass::Roof,
            _ => ShapeClass::Other,
        }
    }
}

/// The editable vector form of one detection after regularization
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledContour {
    pub points: Vec<Point>,
    pub label: String,
    /// `false` only for open trim polylines
    pub closed: bool,
}

impl LabeledContour {
    pub fn new(points: Vec<Point>, label: impl Into<String>, closed: bool) -> Self {
        Self {
            points,
            label: label.into(),
            closed,
        }
    }

    /// Fewest points this contour may hold
    pub fn min_points(&self) -> usize {
        if self.closed { 3 } else { 2 }
    }

    /// Whether the contour satisfies its structural minimum
    pub fn is_valid(&self) -> bool {
        self.points.len() >= self.min_points()
    }

    /// Interior hit-test, boundary inclusive
    pub fn contains(&self, p: Point) -> bool {
        point_in_polygon(p, &self.points)
    }

    /// Index of the first vertex strictly closer than `radius` to `p`
    pub fn handle_at(&self, p: Point, radius: f32) -> Option<usize> {
        self.points.iter().position(|v| v.distance(p) < radius)
    }
}
