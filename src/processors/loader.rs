// snapsize/src/processors/loader.rs
use crate::core::{ResizeError, Result, MAX_DIMENSION};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// A decoded raster. Immutable once decoded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(image: DynamicImage) -> Self {
        Self { image }
    }
}

#[derive(Clone)]
pub struct Loader {
    max_dimensions: Option<(u32, u32)>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_dimensions: Some((MAX_DIMENSION, MAX_DIMENSION)),
        }
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_dimensions = Some((width, height));
        self
    }

    /// Decodes raw bytes, guessing the container from the content.
    pub fn decode(&self, data: &[u8]) -> Result<SourceImage> {
        if data.is_empty() {
            return Err(ResizeError::Decode("input is empty".to_string()));
        }

        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ResizeError::Decode(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        if let Some((max_w, max_h)) = self.max_dimensions {
            if width > max_w || height > max_h {
                return Err(ResizeError::Decode(format!(
                    "Image dimensions {}x{} exceed maximum {}x{}",
                    width, height, max_w, max_h
                )));
            }
        }

        log::debug!(
            "Decoded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(SourceImage { image })
    }

    pub fn read(&self, path: &Path) -> Result<Vec<u8>> {
        log::debug!("Reading image from: {}", path.display());

        if !path.exists() {
            return Err(ResizeError::InvalidParameter(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        Ok(std::fs::read(path)?)
    }

    /// Reads only the header: `(width, height, format name)`.
    pub fn probe(&self, path: &Path) -> Result<(u32, u32, String)> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;

        let format = reader
            .format()
            .map(|f| format!("{:?}", f).to_uppercase())
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        Ok((width, height, format))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
