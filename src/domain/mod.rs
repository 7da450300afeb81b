//! Pure domain types with minimal dependencies
//!
//! Geometry, contours and selection types shared by extraction, the edit
//! session and rendering. Nothing here touches images or files.

pub mod contour;
pub mod geometry;
pub mod selection;

pub use contour::*;
pub use geometry::*;
pub use selection::*;
