//! Typed edit commands and the single entry point that applies them

use crate::capture::image::WorkingImage;
use crate::domain::{Point, SelectionResult};
use crate::error::EditorError;
use crate::extraction::ContourSource;
use crate::render::export::{ExportPaths, Exporter};

use super::state::EditSession;

/// Every mutation an operator can request, in image coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Grab a handle or delete the contour under the point
    SelectAt(Point),
    /// Move the grabbed handle
    DragTo(Point),
    /// Let go of the grabbed handle
    ReleaseDrag,
    /// Remove the selected vertex
    DeleteSelectedPoint,
    /// Restore the previous contour set
    Undo,
    /// Show/hide the first class starting with this character
    ToggleVisibility(char),
    /// Re-run detection and extraction at a new confidence
    Reextract(f32),
    /// Write mask and overlay artifacts
    Save,
}

/// What applying a command did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Selection(SelectionResult),
    /// A command that changed nothing or needs no report
    Done,
    PointDeleted(bool),
    Undone(bool),
    VisibilityChanged(Option<(String, bool)>),
    Reextracted(usize),
    Saved(ExportPaths),
}

/// Collaborators a command may need besides the session itself
pub struct EditContext<'a, S> {
    pub source: &'a S,
    pub image: &'a WorkingImage,
    pub exporter: &'a Exporter,
}

/// Apply one command to the session.
///
/// Only `Reextract` and `Save` can fail; every other command is a silent
/// no-op when it does not apply.
pub fn apply<S: ContourSource>(
    session: &mut EditSession,
    ctx: &EditContext<'_, S>,
    command: Command,
) -> Result<Outcome, EditorError> {
    let outcome = match command {
        Command::SelectAt(p) => Outcome::Selection(session.select_at(p)),
        Command::DragTo(p) => {
            session.drag_to(p);
            Outcome::Done
        }
        Command::ReleaseDrag => {
            session.release_drag();
            Outcome::Done
        }
        Command::DeleteSelectedPoint => Outcome::PointDeleted(session.delete_selected_point()),
        Command::Undo => Outcome::Undone(session.undo()),
        Command::ToggleVisibility(key) => {
            Outcome::VisibilityChanged(session.toggle_visibility(key))
        }
        Command::Reextract(confidence) => {
            Outcome::Reextracted(session.reextract(ctx.source, confidence)?)
        }
        Command::Save => Outcome::Saved(ctx.exporter.export(session, ctx.image)?),
    };
    Ok(outcome)
}
