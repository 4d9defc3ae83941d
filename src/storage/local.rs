// snapsize/src/storage/local.rs
use super::{validate_key, ObjectStore, PutOptions, Visibility};
use crate::core::{ResizeError, Result};
use crate::utils::sanitize_user_prefix;
use chrono::Utc;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Object store backed by a directory tree.
///
/// Objects live under `public/`, `protected/<identity>/` or
/// `private/<identity>/` below the root, mirroring the key layout of the
/// hosted store. Only the owning identity is addressed, so other users'
/// private areas are never listed.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    identity: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, identity: &str) -> Result<Self> {
        let identity = sanitize_user_prefix(identity);
        if identity.is_empty() {
            return Err(ResizeError::InvalidParameter(
                "Object store identity must not be empty".to_string(),
            ));
        }

        let root = root.into();
        std::fs::create_dir_all(&root)?;

        Ok(Self { root, identity })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    fn level_dir(&self, visibility: Visibility) -> PathBuf {
        match visibility {
            Visibility::Public => self.root.join("public"),
            Visibility::Protected => self.root.join("protected").join(&self.identity),
            Visibility::Private => self.root.join("private").join(&self.identity),
        }
    }

    fn object_path(&self, key: &str, visibility: Visibility) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.level_dir(visibility).join(key))
    }
}

impl ObjectStore for LocalObjectStore {
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<()> {
        let path = self.object_path(key, options.visibility)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, bytes)?;
        log::debug!(
            "Stored {} ({}, {} bytes) at {} level",
            key,
            options.content_type,
            bytes.len(),
            options.visibility
        );
        Ok(())
    }

    fn list(&self, prefix: &str, visibility: Visibility) -> Result<Vec<String>> {
        let base = self.level_dir(visibility);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        let mut keys: Vec<String> = WalkDir::new(&base)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&base).ok()?;
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                Some(key)
            })
            .filter(|key| key.starts_with(prefix))
            .collect();

        keys.sort();
        Ok(keys)
    }

    fn signed_url(&self, key: &str, visibility: Visibility, expiry_secs: u64) -> Result<String> {
        let path = self.object_path(key, visibility)?;
        if !path.is_file() {
            return Err(ResizeError::Storage(format!("NoSuchKey: {}", key)));
        }

        let absolute = path.canonicalize()?;
        let expires = Utc::now().timestamp() + i64::try_from(expiry_secs).unwrap_or(i64::MAX / 2);
        Ok(format!("file://{}?expires={}", absolute.display(), expires))
    }
}
