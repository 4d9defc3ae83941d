// snapsize/src/core/engine.rs
use super::{OutputFormat, Quality, ResizeAlgorithm, ResizeRequest, ResizeResult, Result};
use crate::processors::{Encoder, Loader, Resizer};

/// Stateless decode, resize, encode pipeline for one source at a time.
pub struct ResizeEngine {
    request: ResizeRequest,
    loader: Loader,
    resizer: Resizer,
    encoder: Encoder,
}

impl ResizeEngine {
    pub fn new(request: ResizeRequest) -> Self {
        let resizer = Resizer::new(request.algorithm);

        Self {
            request,
            loader: Loader::new(),
            resizer,
            encoder: Encoder::new(),
        }
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn request(&self) -> &ResizeRequest {
        &self.request
    }

    pub fn resize(&self, source_bytes: &[u8]) -> Result<ResizeResult> {
        self.request.validate()?;

        // Decoded and scaled surfaces are dropped at the end of this call.
        let source = self.loader.decode(source_bytes)?;
        let (width, height) = self.resizer.output_dimensions(&source, &self.request)?;
        let scaled = self.resizer.resize(&source, width, height);

        let format = self.request.format;
        let bytes = self
            .encoder
            .encode(&scaled, format, self.request.quality.as_fraction())?;

        Ok(ResizeResult {
            bytes,
            mime_type: format.mime_type(),
            width,
            height,
        })
    }
}

/// One-shot resize with the default filter.
pub fn resize(
    source_bytes: &[u8],
    target_width: u32,
    target_height: u32,
    lock_aspect_ratio: bool,
    format: OutputFormat,
    quality: Quality,
) -> Result<ResizeResult> {
    let request = ResizeRequest {
        target_width,
        target_height,
        lock_aspect_ratio,
        format,
        quality,
        algorithm: ResizeAlgorithm::default(),
    };
    request.validate()?;
    ResizeEngine::new(request).resize(source_bytes)
}
