//! Shared drawing constants
//!
//! Sizes are in image pixels of the full-resolution overlay.

/// Contour outline and fill parameters
pub mod contour {
    /// Outline thickness on the overlay
    pub const OUTLINE: f32 = 2.0;
    /// Alpha of the translucent fill on the overlay
    pub const FILL_ALPHA: u8 = 90;
    /// Stroke thickness of open polylines on the stencil mask
    pub const MASK_LINE: f32 = 3.0;
}

/// Vertex handle parameters
pub mod handle {
    pub const RADIUS: f32 = 5.0;
    pub const SELECTED_RADIUS: f32 = 6.0;
    /// Yellow
    pub const COLOR: [u8; 4] = [255, 255, 0, 255];
    /// Red
    pub const SELECTED_COLOR: [u8; 4] = [255, 0, 0, 255];
}

/// Class name labels on the overlay
pub mod label {
    /// Glyph height in pixels
    pub const SIZE: f32 = 18.0;
    /// Gap between the label baseline and the contour's first vertex
    pub const OFFSET: f32 = 10.0;
}

/// Freehand touch-up brush widths on the stencil mask
pub mod brush {
    pub const PAINT: f32 = 3.0;
    pub const ERASE: f32 = 15.0;
}

/// Scaled output size, never collapsing to zero
#[inline]
pub fn scaled(len: u32, scale: f32) -> u32 {
    ((len as f32) * scale).round().max(1.0) as u32
}
