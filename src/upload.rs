// snapsize/src/upload.rs
use crate::core::Result;
use crate::processors::{BatchInput, BatchProcessor};
use crate::storage::{ObjectStore, PutOptions, StoredObject, Visibility, DEFAULT_URL_EXPIRY_SECS};
use crate::utils::generate_cloud_key;

/// Resizes a batch and saves every result to the user's private area.
pub struct CloudSaver<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    batch: BatchProcessor,
    user_prefix: Option<String>,
}

impl<'a, S: ObjectStore + ?Sized> CloudSaver<'a, S> {
    pub fn new(store: &'a S, batch: BatchProcessor) -> Self {
        Self {
            store,
            batch,
            user_prefix: None,
        }
    }

    /// Scopes keys under `resized/<prefix>/`; sanitized when the key is built.
    pub fn with_user_prefix(mut self, prefix: Option<String>) -> Self {
        self.user_prefix = prefix.filter(|p| !p.is_empty());
        self
    }

    /// Nothing is uploaded unless the whole batch resizes.
    ///
    /// Uploads are not transactional: if a `put` or `signed_url` fails partway,
    /// objects stored before the failure stay in the store and the error is
    /// returned.
    pub fn save_all(&self, inputs: &[BatchInput]) -> Result<Vec<StoredObject>> {
        let entries = self.batch.process(inputs)?;
        let mut uploaded = Vec::with_capacity(entries.len());

        for entry in entries {
            let key = generate_cloud_key(self.user_prefix.as_deref(), self.batch.config().request.format);
            let options = PutOptions {
                content_type: entry.result.mime_type.to_string(),
                visibility: Visibility::Private,
            };

            self.store.put(&key, &entry.result.bytes, &options)?;
            let url = self
                .store
                .signed_url(&key, Visibility::Private, DEFAULT_URL_EXPIRY_SECS)?;

            log::debug!("Uploaded {} as {}", entry.original_name, key);
            uploaded.push(StoredObject { key, url });
        }

        log::info!("Uploaded {} file(s)", uploaded.len());
        Ok(uploaded)
    }
}
