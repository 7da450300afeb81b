//! Session rendering module
//!
//! This module contains:
//! - Drawing constants shared by overlay and mask rendering
//! - Raster rendering using tiny-skia (overlay, stencil mask, preview)
//! - The exporter that writes the final artifacts
pub mod export;
pub mod geometry;
pub mod image;
