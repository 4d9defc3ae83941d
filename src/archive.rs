// snapsize/src/archive.rs
use crate::core::{ResizeError, Result};
use crate::processors::BatchEntry;
use crate::utils::disambiguate;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "resized_images.zip";

/// Ordered filename to bytes mapping that becomes one zip.
///
/// Names are unique inside the archive: a repeated name gets `_2`, `_3`,
/// ... before its extension, first come keeps the plain name.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
    names: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_batch(entries: Vec<BatchEntry>) -> Self {
        let mut builder = Self::new();
        for entry in entries {
            builder.add(&entry.output_name, entry.result.bytes);
        }
        builder
    }

    /// Adds a file, returning the name it is stored under.
    pub fn add(&mut self, name: &str, bytes: Vec<u8>) -> String {
        let stored = disambiguate(name, |candidate| self.names.contains(candidate));
        if stored != name {
            log::warn!("Duplicate archive entry {}, storing as {}", name, stored);
        }

        self.names.insert(stored.clone());
        self.entries.push((stored.clone(), bytes));
        stored
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options).map_err(archive_error)?;
            zip.write_all(bytes)?;
        }

        zip.finish().map_err(archive_error)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let writer = self.write_to(BufWriter::new(File::create(path)?))?;
        writer
            .into_inner()
            .map_err(|e| ResizeError::Io(e.into_error()))?;

        log::info!(
            "Saved archive: {} ({} files)",
            path.display(),
            self.entries.len()
        );
        Ok(())
    }
}

fn archive_error(error: zip::result::ZipError) -> ResizeError {
    ResizeError::Archive(error.to_string())
}
