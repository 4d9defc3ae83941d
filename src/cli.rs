// snapsize/src/cli.rs
use crate::core::{OutputFormat, Quality, ResizeAlgorithm, ResizeError, ResizeRequest, Result};
use crate::processors::BatchConfig;
use crate::storage::DEFAULT_RECENT_LIMIT;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snapsize", version, about = "Batch image resizer with zip export and cloud saves")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resize images and bundle them into a zip archive
    Resize {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Archive to write
        #[arg(short, long, default_value = crate::archive::DEFAULT_ARCHIVE_NAME)]
        output: PathBuf,

        #[command(flatten)]
        options: ResizeOptions,
    },

    /// Resize images and save them to a user's private store area
    Upload {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Root directory of the object store
        #[arg(long, env = "SNAPSIZE_STORE")]
        store: PathBuf,

        /// Signed-in user the uploads belong to
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        options: ResizeOptions,
    },

    /// List a user's most recent uploads with signed URLs
    Recent {
        #[arg(long, env = "SNAPSIZE_STORE")]
        store: PathBuf,

        #[arg(short, long)]
        user: String,

        /// Key prefix to look under before falling back to `resized/`
        #[arg(long, default_value = "")]
        path: String,

        #[arg(short, long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Show dimensions, format and size of an image
    Info { input: PathBuf },
}

#[derive(Args, Debug, Clone)]
pub struct ResizeOptions {
    /// Target width in pixels (0 = unset)
    #[arg(short = 'W', long, default_value_t = 0)]
    pub width: u32,

    /// Target height in pixels (0 = unset)
    #[arg(short = 'H', long, default_value_t = 0)]
    pub height: u32,

    /// Keep the unset side at its source size instead of deriving it
    #[arg(long)]
    pub no_lock_aspect: bool,

    /// Output format: jpeg, png or webp
    #[arg(short, long, default_value = "jpeg", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Quality percent for lossy formats
    #[arg(short, long, default_value_t = 90, value_parser = clap::value_parser!(u8).range(50..=100))]
    pub quality: u8,

    #[arg(short, long, value_enum, default_value_t = Algorithm::Lanczos3)]
    pub algorithm: Algorithm,

    /// Worker threads (0 or 1 processes files one at a time)
    #[arg(short, long, default_value_t = 0)]
    pub threads: usize,

    /// Walk input directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Losslessly re-optimize PNG output
    #[arg(long)]
    pub optimize_png: bool,
}

impl ResizeOptions {
    pub fn to_request(&self) -> Result<ResizeRequest> {
        let request = ResizeRequest {
            target_width: self.width,
            target_height: self.height,
            lock_aspect_ratio: !self.no_lock_aspect,
            format: self.format,
            quality: Quality::new(self.quality)?,
            algorithm: self.algorithm.into(),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn to_config(&self, show_progress: bool) -> Result<BatchConfig> {
        Ok(BatchConfig {
            request: self.to_request()?,
            threads: self.threads,
            show_progress,
            optimize_png: self.optimize_png,
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

fn parse_format(value: &str) -> std::result::Result<OutputFormat, ResizeError> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_defaults_match_app_defaults() {
        let cli = Cli::try_parse_from(["snapsize", "resize", "a.png"]).unwrap();
        let Commands::Resize { inputs, output, options } = cli.command else {
            panic!("expected resize");
        };
        assert_eq!(inputs, [PathBuf::from("a.png")]);
        assert_eq!(output, PathBuf::from("resized_images.zip"));

        let request = options.to_request().unwrap();
        assert_eq!(request, ResizeRequest::default());
    }

    #[test]
    fn resize_flags_map_to_request() {
        let cli = Cli::try_parse_from([
            "snapsize", "resize", "dir", "-W", "1000", "--no-lock-aspect", "-f", "image/webp", "-q", "75",
            "-a", "nearest", "-t", "4",
        ])
        .unwrap();
        let Commands::Resize { options, .. } = cli.command else {
            panic!("expected resize");
        };

        let config = options.to_config(false).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.request.target_width, 1000);
        assert!(!config.request.lock_aspect_ratio);
        assert_eq!(config.request.format, OutputFormat::WebP);
        assert_eq!(config.request.quality.percent(), 75);
        assert_eq!(config.request.algorithm, ResizeAlgorithm::Nearest);
    }

    #[test]
    fn quality_outside_range_is_rejected() {
        assert!(Cli::try_parse_from(["snapsize", "resize", "a.png", "-q", "40"]).is_err());
        assert!(Cli::try_parse_from(["snapsize", "resize", "a.png", "-f", "gif"]).is_err());
    }

    #[test]
    fn recent_requires_store_and_user() {
        let cli = Cli::try_parse_from(["snapsize", "recent", "--store", "/tmp/s", "-u", "amy"]).unwrap();
        let Commands::Recent { limit, path, .. } = cli.command else {
            panic!("expected recent");
        };
        assert_eq!(limit, DEFAULT_RECENT_LIMIT);
        assert!(path.is_empty());
    }
}
