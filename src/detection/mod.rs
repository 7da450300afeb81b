//! Detection adapter around a black-box instance-segmentation detector
//!
//! The detector runs at its own square input size; the adapter maps every
//! instance mask back to the working image resolution and resolves class
//! labels.

pub mod replay;

use image::{GrayImage, Luma, RgbImage};

use crate::capture::image::WorkingImage;
use crate::error::EditorError;

pub use replay::ReplayDetector;

/// One raw instance as reported by a detector, at detector resolution
#[derive(Clone, Debug)]
pub struct RawInstance {
    pub class_id: usize,
    pub score: f32,
    pub mask: GrayImage,
}

/// Everything a detector reports for one call
#[derive(Clone, Debug, Default)]
pub struct DetectorOutput {
    /// Class labels indexed by class id, in the detector's own order
    pub labels: Vec<String>,
    pub instances: Vec<RawInstance>,
}

/// The segmentation model capability
pub trait Detector {
    fn detect(&self, input: &RgbImage, confidence: f32) -> Result<DetectorOutput, EditorError>;
}

/// One instance mapped to the working image: binary mask plus class
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub label: String,
    /// 255 = foreground, 0 = background, at working resolution
    pub mask: GrayImage,
}

/// Wraps a detector and converts its output to working-resolution detections
pub struct DetectionAdapter<D> {
    detector: D,
    input_size: u32,
}

impl<D: Detector> DetectionAdapter<D> {
    pub fn new(detector: D, input_size: u32) -> Self {
        Self {
            detector,
            input_size: input_size.max(1),
        }
    }

    /// Run the detector and return detections plus class labels in detector
    /// order. An empty detection list is a valid result.
    pub fn detect(
        &self,
        image: &WorkingImage,
        confidence: f32,
    ) -> Result<(Vec<Detection>, Vec<String>), EditorError> {
        let input = image.detector_input(self.input_size);
        let output = self.detector.detect(&input, confidence)?;
        log::debug!(
            "Detector returned {} instances at confidence {:.2}",
            output.instances.len(),
            confidence
        );

        let (width, height) = (image.width(), image.height());
        let detections = output
            .instances
            .into_iter()
            .map(|instance| {
                let label = output
                    .labels
                    .get(instance.class_id)
                    .cloned()
                    .unwrap_or_else(|| format!("class_{}", instance.class_id));
                Detection {
                    class_id: instance.class_id,
                    label,
                    mask: to_working_mask(&instance.mask, width, height),
                }
            })
            .collect();

        Ok((detections, output.labels))
    }
}

/// Resize a detector mask to the working resolution and binarize it
fn to_working_mask(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    let resized = if mask.dimensions() == (width, height) {
        mask.clone()
    } else {
        image::imageops::resize(mask, width, height, image::imageops::FilterType::Nearest)
    };
    GrayImage::from_fn(width, height, |x, y| {
        if resized.get_pixel(x, y)[0] > 127 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
