// snapsize/src/core/mod.rs
pub mod engine;

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest width or height a request may ask for.
pub const MAX_DIMENSION: u32 = 100_000;

/// Largest surface the engine will allocate, 16384x16384.
pub const MAX_OUTPUT_PIXELS: u64 = 268_435_456;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// File extension used for output names and object keys.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Lossy formats are the only ones where quality matters.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(format) = Self::from_mime(&lower) {
            return Ok(format);
        }
        match lower.as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::WebP),
            _ => Err(ResizeError::InvalidParameter(format!(
                "Unsupported output format: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        f.write_str(name)
    }
}

/// Output quality as the integer percentage users pick (50 to 100).
///
/// Encoders take a fraction instead, see [`Quality::as_fraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 50;
    pub const MAX: u8 = 100;

    pub fn new(percent: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&percent) {
            return Err(ResizeError::InvalidParameter(format!(
                "Quality must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                percent
            )));
        }
        Ok(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// Percent to the normalized `[0.5, 1.0]` fraction encoders expect.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Everything the engine needs to turn one source image into one output.
///
/// A target dimension of `0` means "not set".
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub target_width: u32,
    pub target_height: u32,
    pub lock_aspect_ratio: bool,
    pub format: OutputFormat,
    pub quality: Quality,
    pub algorithm: ResizeAlgorithm,
}

impl Default for ResizeRequest {
    fn default() -> Self {
        Self {
            target_width: 0,
            target_height: 0,
            lock_aspect_ratio: true,
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
            algorithm: ResizeAlgorithm::Lanczos3,
        }
    }
}

impl ResizeRequest {
    pub fn validate(&self) -> Result<()> {
        if self.target_width > MAX_DIMENSION || self.target_height > MAX_DIMENSION {
            return Err(ResizeError::InvalidParameter(format!(
                "Dimensions too large (max {} pixels)",
                MAX_DIMENSION
            )));
        }
        Ok(())
    }
}

/// Encoded output of a single resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeResult {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Batch aborted at item {index} ({name}): {source}")]
    BatchAbort {
        index: usize,
        name: String,
        #[source]
        source: Box<ResizeError>,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResizeError {
    pub fn is_decode(&self) -> bool {
        matches!(self, ResizeError::Decode(_))
    }

    pub fn is_encode(&self) -> bool {
        matches!(self, ResizeError::Encode(_))
    }
}

pub type Result<T> = std::result::Result<T, ResizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_percent_maps_to_fraction() {
        assert_eq!(Quality::new(50).unwrap().as_fraction(), 0.5);
        assert_eq!(Quality::new(90).unwrap().as_fraction(), 0.9);
        assert_eq!(Quality::new(100).unwrap().as_fraction(), 1.0);
    }

    #[test]
    fn quality_outside_range_is_rejected() {
        assert!(Quality::new(49).is_err());
        assert!(Quality::new(101).is_err());
        assert!(Quality::new(0).is_err());
    }

    #[test]
    fn format_parses_names_and_mime_types() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("image/webp".parse::<OutputFormat>().unwrap(), OutputFormat::WebP);
        assert_eq!("png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!("gif".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn default_request_matches_reset_state() {
        let request = ResizeRequest::default();
        assert_eq!(request.target_width, 0);
        assert_eq!(request.target_height, 0);
        assert!(request.lock_aspect_ratio);
        assert_eq!(request.format, OutputFormat::Jpeg);
        assert_eq!(request.quality.percent(), 90);
    }

    #[test]
    fn oversized_request_fails_validation() {
        let request = ResizeRequest {
            target_width: MAX_DIMENSION + 1,
            ..Default::default()
        };
        assert!(request.validate().is_err());
        assert!(ResizeRequest::default().validate().is_ok());
    }
}
