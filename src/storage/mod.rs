// snapsize/src/storage/mod.rs
//! Object-store boundary: access levels, the canonical store trait, and the
//! adapter that turns loosely shaped provider responses into plain keys.
mod listing;
mod local;

pub use listing::{normalize_listing, normalize_url, split_visibility_prefix, Normalized, RawStore};
pub use local::LocalObjectStore;

use crate::core::{ResizeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed URLs handed out by the app are valid for an hour.
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 3600;
pub const DEFAULT_RECENT_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Protected,
    #[default]
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    pub content_type: String,
    pub visibility: Visibility,
}

/// Canonical `{key, url}` record for anything stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

pub trait ObjectStore {
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<()>;

    /// Keys under `prefix` in the given access level.
    fn list(&self, prefix: &str, visibility: Visibility) -> Result<Vec<String>>;

    fn signed_url(&self, key: &str, visibility: Visibility, expiry_secs: u64) -> Result<String>;
}

/// Rejects keys that could escape their access level.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ResizeError::Storage("key is empty".to_string()));
    }

    if key.len() > 1024 {
        return Err(ResizeError::Storage("key is too long (max 1024)".to_string()));
    }

    if key.split('/').any(|segment| segment == "..")
        || key.starts_with('/')
        || key.contains("//")
        || key.contains('\\')
    {
        return Err(ResizeError::Storage(format!("path traversal detected in key {}", key)));
    }

    Ok(())
}

/// Most recent uploads for the signed-in user, newest first.
///
/// Tries `path`, `path/`, then the `resized` prefixes and finally the level
/// root, stopping at the first prefix that lists anything. Items that cannot
/// be signed are skipped. Listing failures yield an empty result.
pub fn recent_uploads(store: &dyn ObjectStore, path: &str, limit: usize) -> Vec<StoredObject> {
    let mut candidates: Vec<String> = Vec::new();
    if !path.is_empty() {
        candidates.push(path.to_string());
        if !path.ends_with('/') {
            candidates.push(format!("{}/", path));
        }
    }
    candidates.push(format!("{}/", crate::utils::CLOUD_ROOT));
    candidates.push(crate::utils::CLOUD_ROOT.to_string());
    candidates.push(String::new());

    let mut keys = Vec::new();
    for prefix in &candidates {
        match store.list(prefix, Visibility::Private) {
            Ok(found) if !found.is_empty() => {
                log::debug!("Found {} items for prefix {:?}", found.len(), prefix);
                keys = found;
                break;
            }
            Ok(_) => {}
            Err(e) => log::debug!("Listing failed for prefix {:?}: {}", prefix, e),
        }
    }

    let start = keys.len().saturating_sub(limit);
    keys[start..]
        .iter()
        .rev()
        .filter_map(|key| {
            let (visibility, logical) = split_visibility_prefix(key);
            match store.signed_url(logical, visibility, DEFAULT_URL_EXPIRY_SECS) {
                Ok(url) => Some(StoredObject {
                    key: key.clone(),
                    url,
                }),
                Err(e) => {
                    log::warn!("Error getting signed URL for {}: {}", key, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct FakeStore {
        keys: BTreeMap<String, Vec<String>>,
        unsignable: Vec<String>,
        signed: RefCell<Vec<(String, Visibility)>>,
    }

    impl ObjectStore for FakeStore {
        fn put(&self, _key: &str, _bytes: &[u8], _options: &PutOptions) -> Result<()> {
            Ok(())
        }

        fn list(&self, prefix: &str, _visibility: Visibility) -> Result<Vec<String>> {
            match self.keys.get(prefix) {
                Some(keys) => Ok(keys.clone()),
                None => Err(ResizeError::Storage("NoSuchPrefix".to_string())),
            }
        }

        fn signed_url(&self, key: &str, visibility: Visibility, _expiry: u64) -> Result<String> {
            if self.unsignable.iter().any(|k| k == key) {
                return Err(ResizeError::Storage("AccessDenied".to_string()));
            }
            self.signed.borrow_mut().push((key.to_string(), visibility));
            Ok(format!("https://cdn.test/{}/{}", visibility, key))
        }
    }

    #[test]
    fn recent_uploads_falls_back_to_resized_prefix() {
        let mut store = FakeStore::default();
        store.keys.insert("albums/".to_string(), vec![]);
        store.keys.insert(
            "resized/".to_string(),
            vec!["resized/a/1_x.jpg".to_string(), "resized/a/2_y.jpg".to_string()],
        );

        let recent = recent_uploads(&store, "albums", 12);
        let keys: Vec<_> = recent.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["resized/a/2_y.jpg", "resized/a/1_x.jpg"]);
    }

    #[test]
    fn recent_uploads_keeps_last_n_newest_first() {
        let mut store = FakeStore::default();
        store.keys.insert(
            "resized/".to_string(),
            (1..=5).map(|i| format!("resized/{}.png", i)).collect(),
        );

        let recent = recent_uploads(&store, "", 2);
        let keys: Vec<_> = recent.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["resized/5.png", "resized/4.png"]);
    }

    #[test]
    fn recent_uploads_signs_with_level_from_key() {
        let mut store = FakeStore::default();
        store.keys.insert(
            "resized/".to_string(),
            vec![
                "public/resized/p.jpg".to_string(),
                "private/us-east-1_abc/resized/q.jpg".to_string(),
                "protected/us-east-1_abc/resized/r.jpg".to_string(),
            ],
        );

        let recent = recent_uploads(&store, "", 12);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[2].key, "public/resized/p.jpg");
        assert_eq!(
            *store.signed.borrow(),
            vec![
                ("resized/r.jpg".to_string(), Visibility::Protected),
                ("resized/q.jpg".to_string(), Visibility::Private),
                ("resized/p.jpg".to_string(), Visibility::Public),
            ]
        );
    }

    #[test]
    fn unsignable_items_are_skipped() {
        let mut store = FakeStore::default();
        store.keys.insert(
            "resized/".to_string(),
            vec!["resized/ok.jpg".to_string(), "resized/bad.jpg".to_string()],
        );
        store.unsignable.push("resized/bad.jpg".to_string());

        let recent = recent_uploads(&store, "", 12);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].url, "https://cdn.test/private/resized/ok.jpg");
    }

    #[test]
    fn listing_failure_is_empty() {
        assert!(recent_uploads(&FakeStore::default(), "x", 12).is_empty());
    }

    #[test]
    fn key_validation() {
        assert!(validate_key("resized/a/1_x.jpg").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("/abs").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a.b..c").is_ok());
    }
}
