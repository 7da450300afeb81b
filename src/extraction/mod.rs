//! Contour extraction
//!
//! Turns working-resolution detection masks into regularized, editable
//! contours, and bundles detection + extraction into a re-runnable source.

pub mod regularize;

use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};

use crate::capture::image::WorkingImage;
use crate::detection::{Detection, DetectionAdapter, Detector};
use crate::domain::{LabeledContour, Point, polygon_area};
use crate::error::EditorError;

/// Converts detections into labeled contours
#[derive(Clone, Copy, Debug)]
pub struct ContourExtractor {
    /// Traced polygons with a smaller area are discarded
    pub min_area: f32,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self { min_area: 100.0 }
    }
}

impl ContourExtractor {
    pub fn new(min_area: f32) -> Self {
        Self { min_area }
    }

    pub fn extract(&self, detections: &[Detection]) -> Vec<LabeledContour> {
        let mut contours = Vec::new();
        for detection in detections {
            for traced in trace_outer_boundaries(&detection.mask) {
                let area = polygon_area(&traced);
                if area < self.min_area {
                    log::debug!(
                        "Skipping {} (class {}) region with area {:.1} (< {})",
                        detection.label,
                        detection.class_id,
                        area,
                        self.min_area
                    );
                    continue;
                }
                if let Some(contour) = regularize::regularize(&detection.label, &traced) {
                    contours.push(contour);
                }
            }
        }
        contours
    }
}

/// Trace the outermost boundaries of every foreground region in a mask
pub fn trace_outer_boundaries(mask: &GrayImage) -> Vec<Vec<Point>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let mut points: Vec<Point> = c
                .points
                .iter()
                .map(|p| Point::new(p.x as f32, p.y as f32))
                .collect();
            points.dedup();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }
            points
        })
        .filter(|points| points.len() >= 3)
        .collect()
}

/// Result of one detection + extraction run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extraction {
    pub contours: Vec<LabeledContour>,
    /// Class labels in detector-reported order
    pub labels: Vec<String>,
}

/// Anything that can produce a fresh contour set for a confidence threshold
pub trait ContourSource {
    fn extract(&self, confidence: f32) -> Result<Extraction, EditorError>;
}

/// Detection adapter and contour extractor bound to one working image
pub struct Pipeline<D> {
    pub image: WorkingImage,
    adapter: DetectionAdapter<D>,
    extractor: ContourExtractor,
}

impl<D: Detector> Pipeline<D> {
    pub fn new(image: WorkingImage, adapter: DetectionAdapter<D>, extractor: ContourExtractor) -> Self {
        Self {
            image,
            adapter,
            extractor,
        }
    }
}

impl<D: Detector> ContourSource for Pipeline<D> {
    fn extract(&self, confidence: f32) -> Result<Extraction, EditorError> {
        let (detections, labels) = self.adapter.detect(&self.image, confidence)?;
        let contours = self.extractor.extract(&detections);
        log::info!(
            "Extracted {} contours from {} detections at confidence {:.2}",
            contours.len(),
            detections.len(),
            confidence
        );
        Ok(Extraction { contours, labels })
    }
}
