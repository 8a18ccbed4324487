//! The ingestion pipeline.
//!
//! Text notes: resolve a title, insert. Audio notes: store the raw bytes,
//! transcribe, resolve a title, insert with the public audio URL. If any
//! stage after the upload fails, the stored object is deleted best-effort so
//! the bucket does not accumulate orphans; the original error is returned
//! either way.

use std::time::Instant;

use tracing::{info, warn};

use notavoz_core::{
    AudioAsset, AudioUpload, IngestionRequest, NewNote, NoteRecord, Principal, Result, TextUpload,
    NOTE_TYPE_AUDIO, NOTE_TYPE_TEXT,
};

use crate::AppState;

/// Run one classified request through the pipeline.
pub async fn run(
    state: &AppState,
    owner: &Principal,
    request: IngestionRequest,
) -> Result<NoteRecord> {
    request.validate()?;
    let started = Instant::now();

    let record = match request {
        IngestionRequest::Text(upload) => ingest_text(state, owner, upload).await?,
        IngestionRequest::Audio(upload) => ingest_audio(state, owner, upload).await?,
    };

    info!(
        subsystem = "api",
        component = "ingest",
        note_id = %record.id,
        owner_id = %owner.id,
        note_type = %record.note_type,
        duration_ms = started.elapsed().as_millis() as u64,
        "Note ingested"
    );
    Ok(record)
}

async fn ingest_text(
    state: &AppState,
    owner: &Principal,
    upload: TextUpload,
) -> Result<NoteRecord> {
    let title = resolve_title(state, upload.title.as_deref(), &upload.text).await?;
    let note_type = upload
        .note_type
        .unwrap_or_else(|| NOTE_TYPE_TEXT.to_string());

    state
        .notes
        .insert(
            owner,
            NewNote {
                title,
                text: upload.text,
                note_type,
                audio_url: None,
            },
        )
        .await
}

async fn ingest_audio(
    state: &AppState,
    owner: &Principal,
    upload: AudioUpload,
) -> Result<NoteRecord> {
    let asset = state
        .audio_store
        .put(owner, &upload.filename, &upload.content_type, &upload.bytes)
        .await?;

    match finish_audio(state, owner, upload, &asset).await {
        Ok(record) => Ok(record),
        Err(err) => {
            compensate(state, &asset).await;
            Err(err)
        }
    }
}

/// The stages after the object upload. Split out so a failure in any of them
/// triggers exactly one compensation pass.
async fn finish_audio(
    state: &AppState,
    owner: &Principal,
    upload: AudioUpload,
    asset: &AudioAsset,
) -> Result<NoteRecord> {
    let text = state.transcriber.transcribe(&upload.bytes).await?;
    let title = resolve_title(state, upload.title.as_deref(), &text).await?;
    let note_type = upload
        .note_type
        .unwrap_or_else(|| NOTE_TYPE_AUDIO.to_string());

    state
        .notes
        .insert(
            owner,
            NewNote {
                title,
                text,
                note_type,
                audio_url: Some(asset.public_url.clone()),
            },
        )
        .await
}

/// Best-effort removal of the stored audio object after a pipeline failure.
///
/// A failed delete is logged and swallowed: the caller's error is the one
/// that matters, and a leaked object is recoverable by inspection.
async fn compensate(state: &AppState, asset: &AudioAsset) {
    warn!(
        subsystem = "api",
        component = "ingest",
        storage_key = %asset.storage_key,
        "Rolling back stored audio object"
    );
    if let Err(err) = state.audio_store.delete(&asset.storage_key).await {
        warn!(
            subsystem = "api",
            component = "ingest",
            storage_key = %asset.storage_key,
            error = %err,
            "Rollback delete failed; object may be orphaned"
        );
    }
}

/// Use the caller's title when one was provided (non-blank after trimming);
/// otherwise synthesize one from the note text.
async fn resolve_title(
    state: &AppState,
    provided: Option<&str>,
    text: &str,
) -> Result<String> {
    match provided.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => state.titles.generate_title(text).await,
    }
}
