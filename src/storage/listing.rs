// snapsize/src/storage/listing.rs
use super::{ObjectStore, PutOptions, Visibility};
use crate::core::{ResizeError, Result};
use serde_json::Value;

/// Container fields providers have used for listing results.
const LIST_FIELDS: [&str; 4] = ["results", "items", "objects", "Resources"];

/// Field names providers have used for an item's key.
const KEY_FIELDS: [&str; 8] = [
    "key", "Key", "path", "name", "keyName", "KeyName", "Filename", "filename",
];

/// A provider that answers in its own JSON shapes.
pub trait RawStore {
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<()>;

    fn list_raw(&self, prefix: &str, visibility: Visibility) -> Result<Value>;

    fn signed_url_raw(&self, key: &str, visibility: Visibility, expiry_secs: u64) -> Result<Value>;
}

/// Maps every known listing shape to plain keys, in listing order.
///
/// Accepts a bare array or an object holding the array under one of the
/// known container fields. Items are strings or objects keyed by one of the
/// known key fields; items without a usable key are dropped.
pub fn normalize_listing(response: &Value) -> Vec<String> {
    let items = match response {
        Value::Array(items) => items,
        Value::Object(map) => match LIST_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_array))
        {
            Some(items) => items,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let key = item_key(item);
            if key.is_none() {
                log::warn!("Skipping listing item without key at index {}", index);
            }
            key
        })
        .collect()
}

fn item_key(item: &Value) -> Option<String> {
    match item {
        Value::String(key) if !key.is_empty() => Some(key.clone()),
        Value::Object(map) => KEY_FIELDS
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .find(|key| !key.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Signed URL responses are either the URL itself or `{ "url": ... }`.
pub fn normalize_url(response: &Value) -> Option<String> {
    match response {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(map) => match map.get("url") {
            Some(Value::String(url)) if !url.is_empty() => Some(url.clone()),
            Some(Value::Object(inner)) => inner.get("href").and_then(Value::as_str).map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}

/// Splits an optional leading access-level segment off a listed key.
///
/// `public/` maps to public, `protected/<id>/` to protected, `private/<id>/`
/// (or a bare `private/`) to private. Keys without a level are private.
pub fn split_visibility_prefix(key: &str) -> (Visibility, &str) {
    if let Some(rest) = key.strip_prefix("public/") {
        return (Visibility::Public, rest);
    }
    if let Some(rest) = key.strip_prefix("protected/") {
        return (Visibility::Protected, strip_identity(rest));
    }
    if let Some(rest) = key.strip_prefix("private/") {
        return (Visibility::Private, strip_identity(rest));
    }
    (Visibility::Private, key)
}

fn strip_identity(rest: &str) -> &str {
    match rest.split_once('/') {
        Some((id, logical))
            if !id.is_empty()
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) =>
        {
            logical
        }
        _ => rest,
    }
}

/// Wraps a [`RawStore`] so callers only ever see canonical keys and URLs.
pub struct Normalized<R> {
    inner: R,
}

impl<R: RawStore> Normalized<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RawStore> ObjectStore for Normalized<R> {
    fn put(&self, key: &str, bytes: &[u8], options: &PutOptions) -> Result<()> {
        self.inner.put(key, bytes, options)
    }

    fn list(&self, prefix: &str, visibility: Visibility) -> Result<Vec<String>> {
        Ok(normalize_listing(&self.inner.list_raw(prefix, visibility)?))
    }

    fn signed_url(&self, key: &str, visibility: Visibility, expiry_secs: u64) -> Result<String> {
        let response = self.inner.signed_url_raw(key, visibility, expiry_secs)?;
        normalize_url(&response)
            .ok_or_else(|| ResizeError::Storage(format!("no URL returned for {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_of_strings() {
        assert_eq!(normalize_listing(&json!(["a.jpg", "b.jpg"])), ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn every_container_field_is_understood() {
        for field in LIST_FIELDS {
            let mut map = serde_json::Map::new();
            map.insert(field.to_string(), json!([{ "key": "k.png" }]));
            let response = Value::Object(map);
            assert_eq!(normalize_listing(&response), ["k.png"], "{}", field);
        }
    }

    #[test]
    fn every_key_field_is_understood() {
        for field in KEY_FIELDS {
            let mut item = serde_json::Map::new();
            item.insert(field.to_string(), json!("x/y.webp"));
            item.insert("size".to_string(), json!(3));
            let response = Value::Array(vec![Value::Object(item)]);
            assert_eq!(normalize_listing(&response), ["x/y.webp"], "{}", field);
        }
    }

    #[test]
    fn items_without_keys_are_dropped() {
        let response = json!({ "items": [{ "size": 1 }, "", 7, { "path": "ok.jpg" }] });
        assert_eq!(normalize_listing(&response), ["ok.jpg"]);
    }

    #[test]
    fn unknown_shapes_are_empty() {
        assert!(normalize_listing(&json!({ "nextToken": "abc" })).is_empty());
        assert!(normalize_listing(&json!(null)).is_empty());
    }

    #[test]
    fn urls_come_in_two_shapes() {
        assert_eq!(normalize_url(&json!("https://a")).as_deref(), Some("https://a"));
        assert_eq!(normalize_url(&json!({ "url": "https://b" })).as_deref(), Some("https://b"));
        assert_eq!(
            normalize_url(&json!({ "url": { "href": "https://c" } })).as_deref(),
            Some("https://c")
        );
        assert_eq!(normalize_url(&json!({})), None);
    }

    #[test]
    fn level_prefixes_are_split() {
        assert_eq!(
            split_visibility_prefix("public/resized/a.jpg"),
            (Visibility::Public, "resized/a.jpg")
        );
        assert_eq!(
            split_visibility_prefix("protected/eu-1_abc/resized/a.jpg"),
            (Visibility::Protected, "resized/a.jpg")
        );
        assert_eq!(
            split_visibility_prefix("private/eu-1_abc/resized/a.jpg"),
            (Visibility::Private, "resized/a.jpg")
        );
        assert_eq!(split_visibility_prefix("private/a.jpg"), (Visibility::Private, "a.jpg"));
        assert_eq!(
            split_visibility_prefix("resized/a.jpg"),
            (Visibility::Private, "resized/a.jpg")
        );
    }

    struct ShapeShifter;

    impl RawStore for ShapeShifter {
        fn put(&self, _key: &str, _bytes: &[u8], _options: &PutOptions) -> Result<()> {
            Ok(())
        }

        fn list_raw(&self, prefix: &str, _visibility: Visibility) -> Result<Value> {
            Ok(json!({ "results": [{ "Key": format!("{}1.jpg", prefix) }, { "name": format!("{}2.jpg", prefix) }] }))
        }

        fn signed_url_raw(&self, key: &str, _visibility: Visibility, expiry: u64) -> Result<Value> {
            Ok(json!({ "url": format!("https://s3.test/{}?X-Amz-Expires={}", key, expiry) }))
        }
    }

    #[test]
    fn normalized_store_exposes_canonical_records() {
        let store = Normalized::new(ShapeShifter);
        assert_eq!(
            store.list("resized/", Visibility::Private).unwrap(),
            ["resized/1.jpg", "resized/2.jpg"]
        );

        let recent = super::super::recent_uploads(&store, "", 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].key, "resized/2.jpg");
        assert_eq!(recent[0].url, "https://s3.test/resized/2.jpg?X-Amz-Expires=3600");
    }
}
