use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::{
    error::{FusionError, Result},
    traits::RasterPreprocessor,
};

/// BT.601 grayscale conversion over a raw RGBA byte buffer.
///
/// Done by hand rather than through `image`'s built-in luma conversion
/// because the classifier pipeline is calibrated for the 0.299/0.587/0.114
/// weights.
pub fn grayscale_from_rgba(pixels: &[u8], width: u32, height: u32) -> Result<GrayImage> {
    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(FusionError::RasterSizeMismatch {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let i = ((y * width + x) * 4) as usize;
        let r = pixels[i] as f64;
        let g = pixels[i + 1] as f64;
        let b = pixels[i + 2] as f64;
        Luma([(0.299 * r + 0.587 * g + 0.114 * b).round().min(255.0) as u8])
    }))
}

/// Sobel edge detector: gradient magnitude `sqrt(gx^2 + gy^2)` binarized
/// at a fixed threshold
#[derive(Debug, Clone)]
pub struct SobelEdgeDetector {
    pub threshold: f64,
}

impl Default for SobelEdgeDetector {
    fn default() -> Self {
        Self { threshold: 50.0 }
    }
}

impl RasterPreprocessor for SobelEdgeDetector {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        let gx = horizontal_sobel(image);
        let gy = vertical_sobel(image);

        Ok(GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let h = gx.get_pixel(x, y)[0] as f64;
            let v = gy.get_pixel(x, y)[0] as f64;
            let magnitude = (h * h + v * v).sqrt();
            Luma([if magnitude >= self.threshold { 255 } else { 0 }])
        }))
    }
}
