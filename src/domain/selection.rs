//! Selection state and pointer-to-image mapping

use super::geometry::Point;

/// A selected vertex handle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub contour: usize,
    pub point: usize,
}

/// Outcome of a pointer-down hit test
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionResult {
    /// A vertex handle was grabbed and dragging started
    Handle(Selection),
    /// The pointer was inside a contour, which was removed
    Deleted { index: usize, label: String },
    /// Nothing under the pointer
    Miss,
}

/// Maps pointer-device coordinates to image coordinates.
///
/// The preview is a scaled copy of the full-resolution overlay, so a single
/// scale factor is enough.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ViewTransform {
    /// Transform for a preview drawn at `preview_scale` of the image size
    pub fn for_preview(preview_scale: f32) -> Self {
        if preview_scale > 0.0 {
            Self {
                scale: 1.0 / preview_scale,
            }
        } else {
            Self::default()
        }
    }

    pub fn to_image(&self, x: f32, y: f32) -> Point {
        Point::new(x * self.scale, y * self.scale)
    }
}
