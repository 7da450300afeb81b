use std::collections::HashSet;

use crate::domain::{LabeledContour, Point, Selection, SelectionResult};
use crate::error::EditorError;
use crate::extraction::{ContourSource, Extraction};

/// Default pointer distance (exclusive) for grabbing a vertex handle
pub const HANDLE_HIT_RADIUS: f32 = 10.0;

/// Authoritative state of one interactive editing pass.
///
/// Contour order is both z-order and hit-test priority. Every mutation goes
/// through the methods below so the session can be driven headlessly.
#[derive(Clone, Debug)]
pub struct EditSession {
    pub contours: Vec<LabeledContour>,
    /// Class labels in detector-reported order
    pub labels: Vec<String>,
    pub visible: HashSet<String>,
    pub selection: Option<Selection>,
    pub dragging: bool,
    /// Full contour-set snapshots, most recent last
    pub undo_stack: Vec<Vec<LabeledContour>>,
    /// Confidence the current contour set was extracted at
    pub confidence: f32,
    pub handle_radius: f32,
}

impl EditSession {
    /// Start a session from an initial extraction; every class is visible
    pub fn new(extraction: Extraction, confidence: f32) -> Self {
        let visible = extraction
            .labels
            .iter()
            .cloned()
            .chain(extraction.contours.iter().map(|c| c.label.clone()))
            .collect();
        Self {
            contours: extraction.contours,
            labels: extraction.labels,
            visible,
            selection: None,
            dragging: false,
            undo_stack: Vec::new(),
            confidence,
            handle_radius: HANDLE_HIT_RADIUS,
        }
    }

    pub fn with_handle_radius(mut self, radius: f32) -> Self {
        self.handle_radius = radius;
        self
    }

    pub fn is_visible(&self, label: &str) -> bool {
        self.visible.contains(label)
    }

    /// Contours that should be drawn and exported, with their indices
    pub fn visible_contours(&self) -> impl Iterator<Item = (usize, &LabeledContour)> {
        self.contours
            .iter()
            .enumerate()
            .filter(|(_, c)| self.is_visible(&c.label))
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.contours.clone());
    }

    /// Grab the first handle under `p`, otherwise delete the first contour
    /// containing `p`. Hidden contours take part in both tests.
    pub fn select_at(&mut self, p: Point) -> SelectionResult {
        for (ci, contour) in self.contours.iter().enumerate() {
            if let Some(pi) = contour.handle_at(p, self.handle_radius) {
                let selection = Selection {
                    contour: ci,
                    point: pi,
                };
                self.selection = Some(selection);
                self.dragging = true;
                return SelectionResult::Handle(selection);
            }
        }

        if let Some(index) = self.contours.iter().position(|c| c.contains(p)) {
            self.push_undo();
            let removed = self.contours.remove(index);
            self.selection = None;
            self.dragging = false;
            log::info!("Deleted {} contour #{}", removed.label, index);
            return SelectionResult::Deleted {
                index,
                label: removed.label,
            };
        }

        SelectionResult::Miss
    }

    /// Move the grabbed vertex to `p`; ignored unless dragging
    pub fn drag_to(&mut self, p: Point) {
        if !self.dragging {
            return;
        }
        if let Some(sel) = self.selection
            && let Some(point) = self
                .contours
                .get_mut(sel.contour)
                .and_then(|c| c.points.get_mut(sel.point))
        {
            *point = p;
        }
    }

    pub fn release_drag(&mut self) {
        self.dragging = false;
    }

    /// Remove the selected vertex if its contour has more than three points.
    ///
    /// Returns whether a point was removed.
    pub fn delete_selected_point(&mut self) -> bool {
        let Some(sel) = self.selection else {
            return false;
        };
        let Some(len) = self.contours.get(sel.contour).map(|c| c.points.len()) else {
            return false;
        };
        if len <= 3 || sel.point >= len {
            return false;
        }

        self.push_undo();
        self.contours[sel.contour].points.remove(sel.point);
        self.selection = None;
        self.dragging = false;
        log::info!("Deleted point {} from contour #{}", sel.point, sel.contour);
        true
    }

    /// Restore the most recent snapshot. Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.contours = snapshot;
        self.selection = None;
        self.dragging = false;
        log::info!("Undo: restored {} contours", self.contours.len());
        true
    }

    /// Flip visibility of the first label (detector order) starting with
    /// `key`, case-insensitively. Returns the label and its new visibility.
    pub fn toggle_visibility(&mut self, key: char) -> Option<(String, bool)> {
        let key: String = key.to_lowercase().collect();
        let label = self
            .labels
            .iter()
            .find(|l| l.to_lowercase().starts_with(&key))?
            .clone();

        let now_visible = if self.visible.remove(&label) {
            false
        } else {
            self.visible.insert(label.clone());
            true
        };
        log::info!(
            "{} {}",
            if now_visible { "Showing" } else { "Hiding" },
            label
        );
        Some((label, now_visible))
    }

    /// Replace the whole contour set with a fresh extraction.
    ///
    /// On success all edits, the selection and the undo stack are discarded.
    /// On failure the session is left untouched.
    pub fn reextract<S: ContourSource>(
        &mut self,
        source: &S,
        confidence: f32,
    ) -> Result<usize, EditorError> {
        let extraction = match source.extract(confidence) {
            Ok(extraction) => extraction,
            Err(err) => {
                log::warn!("Re-extraction at {:.2} failed, keeping current contours: {}", confidence, err);
                return Err(err);
            }
        };

        let known: HashSet<&String> = self.labels.iter().collect();
        let new_labels: Vec<String> = extraction
            .labels
            .iter()
            .chain(extraction.contours.iter().map(|c| &c.label))
            .filter(|l| !known.contains(l))
            .cloned()
            .collect();
        self.visible.extend(new_labels);

        self.contours = extraction.contours;
        self.labels = extraction.labels;
        self.undo_stack.clear();
        self.selection = None;
        self.dragging = false;
        self.confidence = confidence;
        Ok(self.contours.len())
    }
}
