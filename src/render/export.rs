//! Writes the stencil mask and overlay for the projection pipeline

use std::path::PathBuf;

use image::GrayImage;

use crate::capture::image::WorkingImage;
use crate::error::EditorError;
use crate::session::state::EditSession;

use super::image::{render_mask, render_overlay};

/// Where the artifacts of one save ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub mask: PathBuf,
    pub overlay: PathBuf,
}

/// Writes artifacts to fixed, caller-chosen paths
#[derive(Debug, Clone)]
pub struct Exporter {
    mask_path: PathBuf,
    overlay_path: PathBuf,
    edited_mask_path: PathBuf,
}

impl Exporter {
    /// The touched-up mask goes next to the mask as `mask_edited.png`
    /// unless set with [`Exporter::with_edited_mask_path`]
    pub fn new(mask_path: impl Into<PathBuf>, overlay_path: impl Into<PathBuf>) -> Self {
        let mask_path = mask_path.into();
        let edited_mask_path = mask_path.with_file_name("mask_edited.png");
        Self {
            mask_path,
            overlay_path: overlay_path.into(),
            edited_mask_path,
        }
    }

    pub fn with_edited_mask_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.edited_mask_path = path.into();
        self
    }

    /// Write a freehand touched-up mask as a single-channel PNG
    pub fn export_edited_mask(&self, mask: &GrayImage) -> Result<PathBuf, EditorError> {
        mask.save(&self.edited_mask_path)
            .map_err(|err| EditorError::export(&self.edited_mask_path, err))?;
        log::info!("Saved edited mask to {}", self.edited_mask_path.display());
        Ok(self.edited_mask_path.clone())
    }

    /// Rasterize the visible contours at the original image resolution and
    /// write the single-channel mask and the RGB overlay (without handles)
    pub fn export(&self, session: &EditSession, image: &WorkingImage) -> Result<ExportPaths, EditorError> {
        let mask = render_mask(session, image.width(), image.height());
        mask.save(&self.mask_path)
            .map_err(|err| EditorError::export(&self.mask_path, err))?;

        let overlay = image::DynamicImage::ImageRgba8(render_overlay(image, session, false)).to_rgb8();
        overlay
            .save(&self.overlay_path)
            .map_err(|err| EditorError::export(&self.overlay_path, err))?;

        log::info!(
            "Saved mask to {} and overlay to {}",
            self.mask_path.display(),
            self.overlay_path.display()
        );
        Ok(ExportPaths {
            mask: self.mask_path.clone(),
            overlay: self.overlay_path.clone(),
        })
    }
}
