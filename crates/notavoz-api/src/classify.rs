//! Request body classification.
//!
//! Each inbound note body is decoded exactly once into an
//! [`IngestionRequest`]: `multipart/form-data` becomes an audio upload,
//! `application/json` becomes a text upload, and anything else is rejected
//! before any downstream work happens.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;

use notavoz_core::{
    AudioUpload, CreateTextNoteRequest, Error, IngestionRequest, Result, TextUpload,
};

use crate::MAX_BODY_BYTES;

/// Decode one request body into its ingestion variant.
pub async fn classify_request(request: Request) -> Result<IngestionRequest> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| Error::InvalidInput(format!("Malformed multipart body: {}", e)))?;
        decode_multipart(multipart).await
    } else if content_type.starts_with("application/json") {
        let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
            .await
            .map_err(|e| Error::InvalidInput(format!("Failed to read request body: {}", e)))?;
        decode_json(&bytes)
    } else {
        let label = if content_type.is_empty() {
            "(none)".to_string()
        } else {
            content_type
        };
        Err(Error::UnsupportedMediaType(label))
    }
}

/// Walk the multipart fields into an [`AudioUpload`].
///
/// The file part is the field carrying a filename (or named `file`); `title`
/// and `type` are plain text fields. Unknown fields are skipped.
async fn decode_multipart(mut multipart: Multipart) -> Result<IngestionRequest> {
    let mut title: Option<String> = None;
    let mut note_type: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let is_file = field.file_name().is_some() || field.name() == Some("file");
        if is_file {
            let filename = field.file_name().unwrap_or("audio").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| Error::InvalidInput(format!("Failed to read file part: {}", e)))?
                .to_vec();
            file = Some((filename, content_type, bytes));
        } else {
            match field.name() {
                Some("title") => {
                    title = Some(field.text().await.map_err(|e| {
                        Error::InvalidInput(format!("Failed to read title field: {}", e))
                    })?);
                }
                Some("type") => {
                    note_type = Some(field.text().await.map_err(|e| {
                        Error::InvalidInput(format!("Failed to read type field: {}", e))
                    })?);
                }
                _ => {}
            }
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| Error::InvalidInput("An audio file is required".to_string()))?;

    Ok(IngestionRequest::Audio(AudioUpload {
        title,
        note_type,
        filename,
        content_type,
        bytes,
    }))
}

fn decode_json(bytes: &[u8]) -> Result<IngestionRequest> {
    let body: CreateTextNoteRequest = serde_json::from_slice(bytes)
        .map_err(|e| Error::InvalidInput(format!("Malformed JSON body: {}", e)))?;

    Ok(IngestionRequest::Text(TextUpload {
        title: body.title,
        note_type: body.note_type,
        text: body.transcription_text.unwrap_or_default(),
    }))
}
