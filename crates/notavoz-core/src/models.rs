//! Data model for the ingestion pipeline.
//!
//! The central shape is [`IngestionRequest`]: the request classifier decodes
//! each inbound body exactly once into this tagged union, so every downstream
//! component (storage, transcription, titles, persistence) operates on one
//! normalized representation regardless of whether the note arrived as a
//! multipart audio upload or a JSON text payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Default note type for audio uploads when the caller omits `type`.
pub const NOTE_TYPE_AUDIO: &str = "audio";

/// Default note type for text uploads when the caller omits `type`.
pub const NOTE_TYPE_TEXT: &str = "text";

/// The authenticated identity on whose behalf a request executes.
///
/// Principals are resolved by the identity service and only ever read by this
/// subsystem; they are never created or modified here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub email: Option<String>,
}

/// One decoded ingestion request. Exactly one variant per request.
#[derive(Debug, Clone)]
pub enum IngestionRequest {
    Audio(AudioUpload),
    Text(TextUpload),
}

impl IngestionRequest {
    /// Validate the variant-specific invariants.
    pub fn validate(&self) -> Result<()> {
        match self {
            IngestionRequest::Audio(upload) => upload.validate(),
            IngestionRequest::Text(upload) => upload.validate(),
        }
    }
}

/// An audio note decoded from a multipart body.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub title: Option<String>,
    pub note_type: Option<String>,
    /// Original filename of the uploaded file part.
    pub filename: String,
    /// MIME type of the file part (defaults to octet-stream upstream).
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    /// Invariant: the file part must be present and non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(Error::InvalidInput("An audio file is required".to_string()));
        }
        Ok(())
    }
}

/// A text note decoded from a JSON body.
#[derive(Debug, Clone)]
pub struct TextUpload {
    pub title: Option<String>,
    pub note_type: Option<String>,
    pub text: String,
}

impl TextUpload {
    /// Invariant: the text must be non-empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "transcription_text is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// JSON request body for a text upload: `{title?, transcription_text, type?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTextNoteRequest {
    pub title: Option<String>,
    pub transcription_text: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
}

/// A stored audio object. Created once per audio request, immutable after.
///
/// The object itself is owned by the object store; the resulting note only
/// references it through `public_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAsset {
    pub owner_id: Uuid,
    pub storage_key: String,
    pub public_url: String,
}

/// Fields assembled by the pipeline for one insert.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub text: String,
    pub note_type: String,
    pub audio_url: Option<String>,
}

/// The durable note record, as persisted and as returned to the caller.
///
/// Invariants: `owner_id` always equals the authenticated principal;
/// `audio_url` is set iff the source was audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub text: String,
    #[serde(rename = "type")]
    pub note_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(audio_url: Option<String>) -> NoteRecord {
        NoteRecord {
            id: Uuid::nil(),
            owner_id: Uuid::nil(),
            title: "Aula de terça".to_string(),
            text: "Hoje falamos sobre frações.".to_string(),
            note_type: NOTE_TYPE_TEXT.to_string(),
            audio_url,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_audio_upload_rejects_empty_bytes() {
        let upload = AudioUpload {
            title: None,
            note_type: None,
            filename: "clip.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            bytes: vec![],
        };
        assert!(matches!(upload.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_audio_upload_accepts_non_empty_bytes() {
        let upload = AudioUpload {
            title: Some("Aula".to_string()),
            note_type: None,
            filename: "clip.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            bytes: vec![1, 2, 3],
        };
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_text_upload_rejects_whitespace_only_text() {
        let upload = TextUpload {
            title: Some("x".to_string()),
            note_type: None,
            text: " \n\t ".to_string(),
        };
        assert!(matches!(upload.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_text_upload_accepts_non_empty_text() {
        let upload = TextUpload {
            title: None,
            note_type: None,
            text: "Plano da próxima aula".to_string(),
        };
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_note_record_serializes_camel_case() {
        let json = serde_json::to_value(sample_record(Some("https://example/a.mp3".into()))).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["type"], NOTE_TYPE_TEXT);
        assert_eq!(json["audioUrl"], "https://example/a.mp3");
    }

    #[test]
    fn test_note_record_omits_audio_url_when_absent() {
        let json = serde_json::to_value(sample_record(None)).unwrap();
        assert!(json.get("audioUrl").is_none());
    }

    #[test]
    fn test_create_text_note_request_type_field() {
        let req: CreateTextNoteRequest = serde_json::from_str(
            r#"{"title": "Aula", "transcription_text": "texto", "type": "planning"}"#,
        )
        .unwrap();
        assert_eq!(req.title.as_deref(), Some("Aula"));
        assert_eq!(req.transcription_text.as_deref(), Some("texto"));
        assert_eq!(req.note_type.as_deref(), Some("planning"));
    }

    #[test]
    fn test_create_text_note_request_all_fields_optional() {
        let req: CreateTextNoteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.transcription_text.is_none());
        assert!(req.note_type.is_none());
    }
}
