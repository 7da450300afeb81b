//! Image acquisition module
//!
//! The camera itself is an external collaborator; this module only loads the
//! raster it produced.

pub mod image;
