// snapsize/src/processors/resizer.rs
use crate::core::{
    ResizeAlgorithm, ResizeError, ResizeRequest, Result, MAX_DIMENSION, MAX_OUTPUT_PIXELS,
};
use crate::processors::SourceImage;
use image::{imageops::FilterType, DynamicImage};

/// Computes the effective output size for a source of `sw`x`sh`.
///
/// Both targets set wins outright, aspect lock only fills in a missing one,
/// and an unlocked missing side falls back to the source side. Derived sides
/// are rounded half away from zero and never drop below 1.
pub fn resolve_dimensions(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
    lock_aspect_ratio: bool,
) -> (u32, u32) {
    match (target_width, target_height) {
        (0, 0) => (source_width, source_height),
        (w, 0) if lock_aspect_ratio => {
            let height = scale_side(w, source_height, source_width);
            (w, height)
        }
        (0, h) if lock_aspect_ratio => {
            let width = scale_side(h, source_width, source_height);
            (width, h)
        }
        (w, 0) => (w, source_height),
        (0, h) => (source_width, h),
        (w, h) => (w, h),
    }
}

/// `round(value * numerator / denominator)` clamped to `[1, u32::MAX]`.
fn scale_side(value: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (f64::from(value) * f64::from(numerator) / f64::from(denominator)).round();
    scaled.clamp(1.0, f64::from(u32::MAX)) as u32
}

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Resolved size for `source`, rejected when the surface would be too large.
    pub fn output_dimensions(
        &self,
        source: &SourceImage,
        request: &ResizeRequest,
    ) -> Result<(u32, u32)> {
        let (source_width, source_height) = source.dimensions();
        let (width, height) = resolve_dimensions(
            source_width,
            source_height,
            request.target_width,
            request.target_height,
            request.lock_aspect_ratio,
        );

        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ResizeError::InvalidParameter(format!(
                "Output size {}x{} exceeds {} pixels per side",
                width, height, MAX_DIMENSION
            )));
        }
        if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
            return Err(ResizeError::InvalidParameter(format!(
                "Output size {}x{} exceeds {} total pixels",
                width, height, MAX_OUTPUT_PIXELS
            )));
        }

        Ok((width, height))
    }

    /// Draws `source` scaled into a surface of exactly `width`x`height`.
    pub fn resize(&self, source: &SourceImage, width: u32, height: u32) -> DynamicImage {
        let image = source.as_image();

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image.clone();
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.filter_type())
    }

    fn filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}
