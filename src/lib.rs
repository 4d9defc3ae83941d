pub mod archive;
pub mod auth;
mod cli;
mod core;
pub mod processors;
pub mod storage;
pub mod upload;
mod utils;

pub use archive::ArchiveBuilder;
pub use cli::{Algorithm, Cli, Commands, ResizeOptions};
pub use crate::core::engine::{resize, ResizeEngine};
pub use crate::core::{
    OutputFormat, Quality, ResizeAlgorithm, ResizeError, ResizeRequest, ResizeResult, Result,
    MAX_DIMENSION, MAX_OUTPUT_PIXELS,
};
pub use processors::{
    collect_image_paths, resolve_dimensions, BatchConfig, BatchEntry, BatchInput,
    BatchProcessor, Encoder, Loader, Resizer, SourceImage,
};
pub use upload::CloudSaver;
pub use utils::{
    cloud_key, format_file_size, generate_cloud_key, is_supported_format, output_file_name,
    random_token, sanitize_user_prefix,
};

pub mod prelude {
    pub use crate::{
        ArchiveBuilder, BatchConfig, BatchInput, BatchProcessor, OutputFormat, Quality,
        ResizeEngine, ResizeRequest,
    };
}
