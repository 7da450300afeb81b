//! Detector that replays precomputed instance masks
//!
//! The segmentation model runs elsewhere and dumps its per-instance masks
//! plus a JSON manifest:
//!
//! ```json
//! {
//!   "labels": ["roof", "window", "door", "trim"],
//!   "instances": [
//!     { "class_id": 0, "score": 0.91, "mask": "masks/roof_0.png" }
//!   ]
//! }
//! ```
//!
//! Mask paths are relative to the manifest. Confidence filtering is applied
//! at detect time so threshold changes behave like re-running the model.

use std::path::{Path, PathBuf};

use image::RgbImage;
use serde::Deserialize;

use super::{Detector, DetectorOutput, RawInstance};
use crate::error::EditorError;

#[derive(Debug, Deserialize)]
struct Manifest {
    labels: Vec<String>,
    #[serde(default)]
    instances: Vec<ManifestInstance>,
}

#[derive(Debug, Deserialize)]
struct ManifestInstance {
    class_id: usize,
    score: f32,
    mask: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ReplayDetector {
    labels: Vec<String>,
    instances: Vec<RawInstance>,
}

impl ReplayDetector {
    /// Load a manifest and every mask it references
    pub fn open(manifest_path: &Path) -> Result<Self, EditorError> {
        let text = std::fs::read_to_string(manifest_path)
            .map_err(|err| EditorError::load(manifest_path, err))?;
        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|err| EditorError::load(manifest_path, err))?;
        let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

        let instances = manifest
            .instances
            .into_iter()
            .map(|inst| {
                let path = base.join(&inst.mask);
                let mask = image::open(&path)
                    .map_err(|err| EditorError::load(&path, err))?
                    .to_luma8();
                Ok(RawInstance {
                    class_id: inst.class_id,
                    score: inst.score,
                    mask,
                })
            })
            .collect::<Result<Vec<_>, EditorError>>()?;

        log::info!(
            "Loaded {} precomputed instances ({} classes) from {}",
            instances.len(),
            manifest.labels.len(),
            manifest_path.display()
        );
        Ok(Self {
            labels: manifest.labels,
            instances,
        })
    }
}

impl Detector for ReplayDetector {
    fn detect(&self, _input: &RgbImage, confidence: f32) -> Result<DetectorOutput, EditorError> {
        Ok(DetectorOutput {
            labels: self.labels.clone(),
            instances: self
                .instances
                .iter()
                .filter(|inst| inst.score > confidence)
                .cloned()
                .collect(),
        })
    }
}
