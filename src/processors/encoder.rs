// snapsize/src/processors/encoder.rs
use crate::core::{OutputFormat, ResizeError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use oxipng::{optimize_from_memory, Options};

/// Serializes a scaled surface into one of the output formats.
///
/// Quality is the normalized fraction in `[0.5, 1.0]`; anything else is
/// rejected before touching a codec.
pub struct Encoder {
    optimize_png: bool,
}

impl Encoder {
    pub const MIN_QUALITY: f32 = 0.5;
    pub const MAX_QUALITY: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            optimize_png: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn encode(&self, image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        if !(Self::MIN_QUALITY..=Self::MAX_QUALITY).contains(&quality) {
            return Err(ResizeError::Encode(format!(
                "quality {} is outside [{}, {}] for {}",
                quality,
                Self::MIN_QUALITY,
                Self::MAX_QUALITY,
                format
            )));
        }

        log::debug!(
            "Encoding {}x{} image as {}, quality: {}{}",
            image.width(),
            image.height(),
            format,
            quality,
            if format.is_lossy() { "" } else { " (ignored)" }
        );

        let bytes = match format {
            OutputFormat::Jpeg => self.encode_jpeg(image, quality)?,
            OutputFormat::Png => self.encode_png(image)?,
            OutputFormat::WebP => self.encode_webp(image)?,
        };

        log::debug!("Encoded {} bytes of {}", bytes.len(), format.mime_type());
        Ok(bytes)
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));

        // JPEG has no alpha channel; flatten the way a canvas export does.
        DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(buffer)
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = PngEncoder::new(&mut buffer);

        DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(encoder)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        if self.optimize_png {
            return optimize_from_memory(&buffer, &Options::default())
                .map_err(|e| ResizeError::Encode(format!("PNG optimization failed: {}", e)));
        }

        Ok(buffer)
    }

    fn encode_webp(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = WebPEncoder::new_lossless(&mut buffer);

        DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(encoder)
            .map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(buffer)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction back to the 1..=100 scale the JPEG codec takes.
fn jpeg_quality(fraction: f32) -> u8 {
    (fraction * 100.0).round().clamp(1.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(9, 6, Rgba([200, 40, 10, 128])))
    }

    fn decode_as(bytes: &[u8], format: OutputFormat) -> DynamicImage {
        image::load_from_memory_with_format(bytes, format.image_format()).unwrap()
    }

    #[test]
    fn encodes_every_format_at_requested_size() {
        let encoder = Encoder::new();
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
            let bytes = encoder.encode(&sample(), format, 0.9).unwrap();
            assert_eq!(decode_as(&bytes, format).dimensions(), (9, 6), "{}", format);
        }
    }

    #[test]
    fn png_keeps_alpha() {
        let bytes = Encoder::new().encode(&sample(), OutputFormat::Png, 1.0).unwrap();
        let decoded = decode_as(&bytes, OutputFormat::Png).to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0), &Rgba([200, 40, 10, 128]));
    }

    #[test]
    fn quality_outside_range_is_an_encode_error() {
        let encoder = Encoder::new();
        assert!(encoder.encode(&sample(), OutputFormat::Jpeg, 0.49).unwrap_err().is_encode());
        assert!(encoder.encode(&sample(), OutputFormat::Png, 1.01).unwrap_err().is_encode());
    }

    #[test]
    fn optimized_png_still_decodes() {
        let encoder = Encoder::new().with_png_optimization(true);
        let bytes = encoder.encode(&sample(), OutputFormat::Png, 0.8).unwrap();
        assert_eq!(decode_as(&bytes, OutputFormat::Png).dimensions(), (9, 6));
    }

    #[test]
    fn jpeg_quality_scale() {
        assert_eq!(jpeg_quality(0.5), 50);
        assert_eq!(jpeg_quality(0.9), 90);
        assert_eq!(jpeg_quality(1.0), 100);
    }
}
