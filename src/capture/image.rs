//! Working image type for the raster being annotated

use std::path::Path;

use image::{RgbImage, RgbaImage};

use crate::error::EditorError;

/// The raster being annotated, at its original resolution
#[derive(Clone, Debug)]
pub struct WorkingImage {
    pub rgba: RgbaImage,
}

impl WorkingImage {
    pub fn new(rgba: RgbaImage) -> Self {
        Self { rgba }
    }

    /// Load an image file
    pub fn open(path: &Path) -> Result<Self, EditorError> {
        let rgba = image::open(path)
            .map_err(|err| EditorError::load(path, err))?
            .to_rgba8();
        log::debug!(
            "WorkingImage loaded: {}x{} pixels from {}",
            rgba.width(),
            rgba.height(),
            path.display()
        );
        Ok(Self::new(rgba))
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Resized RGB copy for feeding a detector with a fixed square input
    pub fn detector_input(&self, size: u32) -> RgbImage {
        let rgb = image::DynamicImage::ImageRgba8(self.rgba.clone()).to_rgb8();
        image::imageops::resize(&rgb, size, size, image::imageops::FilterType::Triangle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_is_load_failure() {
        let err = WorkingImage::open(Path::new("/nonexistent/house.png")).unwrap_err();
        assert!(matches!(err, EditorError::Load { .. }));
    }

    #[test]
    fn test_detector_input_is_square() {
        let img = WorkingImage::new(RgbaImage::new(300, 120));
        let input = img.detector_input(64);
        assert_eq!(input.dimensions(), (64, 64));
    }
}
