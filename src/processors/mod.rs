// snapsize/src/processors/mod.rs
mod batch;
mod encoder;
mod loader;
mod resizer;

pub use batch::{collect_image_paths, BatchConfig, BatchEntry, BatchInput, BatchProcessor};
pub use encoder::Encoder;
pub use loader::{Loader, SourceImage};
pub use resizer::{resolve_dimensions, Resizer};
