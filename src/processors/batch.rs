// snapsize/src/processors/batch.rs
use crate::core::engine::ResizeEngine;
use crate::core::{ResizeError, ResizeRequest, ResizeResult, Result};
use crate::processors::{Encoder, Loader};
use crate::utils::{is_supported_format, output_file_name};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One source file handed to the batch driver.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl BatchInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ResizeError::InvalidParameter(format!("Invalid file name: {}", path.display()))
            })?
            .to_string();

        let bytes = Loader::new().read(path)?;
        Ok(Self { name, bytes })
    }
}

/// One successful item of a batch, in input order.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub original_name: String,
    pub output_name: String,
    pub result: ResizeResult,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub request: ResizeRequest,
    /// `0` or `1` runs sequentially; more uses a fixed-size worker pool.
    pub threads: usize,
    pub show_progress: bool,
    pub optimize_png: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            request: ResizeRequest::default(),
            threads: 0,
            show_progress: false,
            optimize_png: false,
        }
    }
}

pub struct BatchProcessor {
    config: BatchConfig,
    thread_pool: Option<rayon::ThreadPool>,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Result<Self> {
        config.request.validate()?;

        let thread_pool = if config.threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads)
                .build()
                .map_err(|e| {
                    ResizeError::InvalidParameter(format!("Failed to create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            config,
            thread_pool,
        })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Resizes every input with the same request.
    ///
    /// The first failing item (lowest index) aborts the whole batch and no
    /// entries are returned.
    pub fn process(&self, inputs: &[BatchInput]) -> Result<Vec<BatchEntry>> {
        if inputs.is_empty() {
            log::warn!("Batch has no inputs");
            return Ok(Vec::new());
        }

        log::info!(
            "Processing {} images ({} at {}%)",
            inputs.len(),
            self.config.request.format,
            self.config.request.quality.percent()
        );

        let engine = ResizeEngine::new(self.config.request.clone())
            .with_encoder(Encoder::new().with_png_optimization(self.config.optimize_png));
        let pb = self.create_progress_bar(inputs.len());

        let entries = match &self.thread_pool {
            Some(pool) => pool.install(|| {
                let tagged: Vec<(usize, Result<ResizeResult>)> = inputs
                    .par_iter()
                    .enumerate()
                    .map(|(index, input)| {
                        let result = engine.resize(&input.bytes);
                        pb.inc(1);
                        (index, result)
                    })
                    .collect();
                self.collect_ordered(inputs, tagged)
            }),
            None => self.run_sequential(&engine, inputs, &pb),
        };

        match &entries {
            Ok(done) => pb.finish_with_message(format!("Resized {} images", done.len())),
            Err(_) => pb.abandon_with_message("Batch aborted"),
        }

        entries
    }

    fn run_sequential(
        &self,
        engine: &ResizeEngine,
        inputs: &[BatchInput],
        pb: &ProgressBar,
    ) -> Result<Vec<BatchEntry>> {
        let mut entries = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            let result = engine
                .resize(&input.bytes)
                .map_err(|e| abort(index, input, e))?;
            entries.push(self.entry(input, result));
            pb.inc(1);
        }

        Ok(entries)
    }

    fn collect_ordered(
        &self,
        inputs: &[BatchInput],
        mut tagged: Vec<(usize, Result<ResizeResult>)>,
    ) -> Result<Vec<BatchEntry>> {
        tagged.sort_by_key(|(index, _)| *index);

        let mut entries = Vec::with_capacity(tagged.len());
        for (index, result) in tagged {
            let input = &inputs[index];
            let result = result.map_err(|e| abort(index, input, e))?;
            entries.push(self.entry(input, result));
        }

        Ok(entries)
    }

    fn entry(&self, input: &BatchInput, result: ResizeResult) -> BatchEntry {
        log::debug!(
            "{} -> {}x{} ({} bytes)",
            input.name,
            result.width,
            result.height,
            result.bytes.len()
        );

        BatchEntry {
            original_name: input.name.clone(),
            output_name: output_file_name(&input.name, self.config.request.format),
            result,
        }
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

fn abort(index: usize, input: &BatchInput, error: ResizeError) -> ResizeError {
    log::error!("Failed to resize {}: {}", input.name, error);
    ResizeError::BatchAbort {
        index,
        name: input.name.clone(),
        source: Box::new(error),
    }
}

/// Expands files and directories into the image files they name, in order.
pub fn collect_image_paths(paths: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut collected = Vec::new();

    for path in paths {
        if path.is_file() {
            collected.push(path.clone());
            continue;
        }

        if !path.is_dir() {
            return Err(ResizeError::InvalidParameter(format!(
                "Input does not exist: {}",
                path.display()
            )));
        }

        let walker = if recursive {
            WalkDir::new(path)
        } else {
            WalkDir::new(path).max_depth(1)
        };

        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_format(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        collected.extend(found);
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OutputFormat;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn config(threads: usize) -> BatchConfig {
        BatchConfig {
            request: ResizeRequest {
                target_width: 8,
                format: OutputFormat::Png,
                ..Default::default()
            },
            threads,
            ..Default::default()
        }
    }

    fn inputs() -> Vec<BatchInput> {
        vec![
            BatchInput::new("a.png", png(16, 8)),
            BatchInput::new("b.jpeg", png(32, 32)),
            BatchInput::new("c", png(4, 16)),
        ]
    }

    #[test]
    fn sequential_batch_keeps_input_order() {
        let entries = BatchProcessor::new(config(0)).unwrap().process(&inputs()).unwrap();

        let names: Vec<_> = entries.iter().map(|e| e.output_name.as_str()).collect();
        assert_eq!(names, ["a_resized.png", "b_resized.png", "c_resized.png"]);
        let sizes: Vec<_> = entries.iter().map(|e| (e.result.width, e.result.height)).collect();
        assert_eq!(sizes, [(8, 4), (8, 8), (8, 32)]);
    }

    #[test]
    fn pooled_batch_matches_sequential_order() {
        let sequential = BatchProcessor::new(config(0)).unwrap().process(&inputs()).unwrap();
        let pooled = BatchProcessor::new(config(3)).unwrap().process(&inputs()).unwrap();

        assert_eq!(sequential.len(), pooled.len());
        for (s, p) in sequential.iter().zip(&pooled) {
            assert_eq!(s.original_name, p.original_name);
            assert_eq!(s.result.bytes, p.result.bytes);
        }
    }

    #[test]
    fn failing_item_aborts_whole_batch() {
        for threads in [0, 4] {
            let mut items = inputs();
            items[1].bytes = b"broken".to_vec();

            let err = BatchProcessor::new(config(threads))
                .unwrap()
                .process(&items)
                .unwrap_err();

            match err {
                ResizeError::BatchAbort { index, name, source } => {
                    assert_eq!(index, 1);
                    assert_eq!(name, "b.jpeg");
                    assert!(source.is_decode());
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn empty_batch_is_empty() {
        let entries = BatchProcessor::new(config(0)).unwrap().process(&[]).unwrap();
        assert!(entries.is_empty());
    }
}
