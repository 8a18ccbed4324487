//! Service traits at the seams of the ingestion pipeline.
//!
//! Every external collaborator (identity, object storage, speech-to-text,
//! language model, relational store) sits behind one of these traits so the
//! pipeline can be exercised in tests with in-process fakes and the HTTP
//! clients can be swapped without touching the orchestration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{AudioAsset, NewNote, NoteRecord, Principal, Result};

/// Resolves a bearer credential to the owning principal.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolve `token` to a [`Principal`].
    ///
    /// Fails with [`crate::Error::Unauthorized`] when the token is invalid,
    /// expired, or the identity service cannot vouch for it.
    async fn resolve_user(&self, token: &str) -> Result<Principal>;
}

/// Durable object storage for raw audio bytes.
#[async_trait]
pub trait AudioStore: Send + Sync {
    /// Persist `bytes` under a fresh per-owner key and return the asset.
    ///
    /// Implementations must refuse to overwrite an existing key.
    async fn put(
        &self,
        owner: &Principal,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<AudioAsset>;

    /// Delete a previously stored object. Used for compensation when a later
    /// pipeline stage fails.
    async fn delete(&self, storage_key: &str) -> Result<()>;
}

/// Drives one audio byte stream to final transcribed text.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Submit the audio and block until the job reaches a terminal status.
    ///
    /// Fails with [`crate::Error::EmptyTranscript`] when the job completes
    /// without detectable speech, [`crate::Error::Transcription`] on upstream
    /// job failure, and [`crate::Error::TranscriptionTimeout`] when the
    /// configured deadline elapses first.
    async fn transcribe(&self, bytes: &[u8]) -> Result<String>;
}

/// Synthesizes a short note title from body text.
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate_title(&self, text: &str) -> Result<String>;
}

/// Owner-scoped note persistence.
///
/// Every operation takes the acting [`Principal`] and is constrained to that
/// principal's rows; there is no administrative bypass surface.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert(&self, owner: &Principal, note: NewNote) -> Result<NoteRecord>;

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<NoteRecord>;

    /// List the owner's notes, newest first.
    async fn list(&self, owner: &Principal) -> Result<Vec<NoteRecord>>;

    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<()>;
}
