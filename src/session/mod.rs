//! Edit session management module
//!
//! This module contains:
//! - Session state (contours, selection, visibility, undo)
//! - Command types and the `apply` entry point
//! - Key shortcuts and the input controller
//! - Freehand touch-up of the exported mask

pub mod input;
pub mod messages;
pub mod shortcuts;
pub mod state;
pub mod touchup;
