//! HTTP object storage client for raw audio.
//!
//! Talks to a bucket API (Supabase-storage style): objects are created with
//! `POST {base}/object/{bucket}/{key}` and publicly readable under
//! `{base}/object/public/{bucket}/{key}`. Writes are create-only: the
//! `x-upsert: false` header makes the server refuse an existing key instead
//! of silently replacing it.
//!
//! Keys are `{owner_id}/{monotonic_millis}_{sanitized_filename}`: the owner
//! prefix separates principals, and the monotonic millisecond counter makes
//! two uploads in the same instant land on distinct keys.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use notavoz_core::{AudioAsset, AudioStore, Error, Principal, Result, StorageConfig};

const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Last millisecond value handed out by [`monotonic_millis`].
static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Current Unix time in milliseconds, strictly increasing per process.
///
/// Two calls in the same wall-clock millisecond return distinct values, so
/// storage keys derived from this never collide within one process.
fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_MILLIS.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

/// Strip path separators, URL-reserved characters, and control characters
/// from an uploaded filename.
///
/// The key is interpolated into the object URL, so `#`, `?`, and `%` must
/// not survive: they would truncate the request path (or mis-decode), and
/// the stored object would no longer match the recorded key.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '#' | '?' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "audio".to_string()
    } else {
        cleaned
    }
}

/// Object storage client over a bucket HTTP API.
pub struct HttpBucketStore {
    base_url: String,
    service_key: String,
    bucket: String,
    client: reqwest::Client,
}

impl HttpBucketStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the storage key for one upload.
    pub fn object_key(owner_id: &uuid::Uuid, filename: &str, millis: i64) -> String {
        format!("{}/{}_{}", owner_id, millis, sanitize_filename(filename))
    }

    /// Public retrieval URL for a stored object.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, key)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, key)
    }
}

#[async_trait]
impl AudioStore for HttpBucketStore {
    async fn put(
        &self,
        owner: &Principal,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<AudioAsset> {
        let key = Self::object_key(&owner.id, filename, monotonic_millis());

        debug!(
            subsystem = "db",
            component = "object_store",
            op = "put",
            owner_id = %owner.id,
            storage_key = %key,
            audio_bytes = bytes.len(),
            "Uploading audio object"
        );

        let response = self
            .client
            .post(self.object_url(&key))
            .bearer_auth(&self.service_key)
            .header("x-upsert", "false")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Upload request failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(Error::Storage(format!("Object {} already exists", key)));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Object store returned {}: {}",
                status, body
            )));
        }

        Ok(AudioAsset {
            owner_id: owner.id,
            storage_key: key.clone(),
            public_url: self.public_url(&key),
        })
    }

    async fn delete(&self, storage_key: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.object_url(storage_key))
            .bearer_auth(&self.service_key)
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Delete request failed: {}", e)))?;

        // A missing object is fine for compensation purposes.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!(
                subsystem = "db",
                component = "object_store",
                storage_key = %storage_key,
                "Object already gone on delete"
            );
            return Ok(());
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "Object store returned {}: {}",
                status, body
            )));
        }

        debug!(
            subsystem = "db",
            component = "object_store",
            op = "delete",
            storage_key = %storage_key,
            "Audio object deleted"
        );
        Ok(())
    }
}
