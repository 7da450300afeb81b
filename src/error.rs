//! Error types for the stencil editor

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    /// An input file (image, manifest, instance mask) is missing or unreadable
    #[error("failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// The detector capability raised
    #[error("detection failed: {0}")]
    Detection(String),

    /// Writing an exported artifact failed
    #[error("failed to export {path}: {reason}")]
    Export { path: PathBuf, reason: String },

    /// A malformed line in the input event stream
    #[error("invalid input event on line {line}: {reason}")]
    Script { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    pub fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EditorError::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn export(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EditorError::Export {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
