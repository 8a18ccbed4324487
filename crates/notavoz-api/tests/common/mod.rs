#![allow(dead_code)]

//! Shared test fixtures: in-process fakes for every service behind the
//! router, with call counters so tests can assert which pipeline stages ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::Router;
use chrono::Utc;
use uuid::Uuid;

use notavoz_api::{app, AppState};
use notavoz_core::{
    AudioAsset, AudioStore, Error, IdentityService, NewNote, NoteRecord, NoteStore, Principal,
    Result, TitleGenerator, TranscriptionService,
};

/// The one token the fake identity service accepts.
pub const TOKEN: &str = "valid-token";

/// Transcript returned by the default fake transcriber.
pub const TRANSCRIPT: &str = "Hoje revisamos frações equivalentes com a turma.";

/// Title returned by the fake title generator.
pub const GENERATED_TITLE: &str = "Revisão de frações";

pub const MULTIPART_BOUNDARY: &str = "----notavoz-test-boundary";

pub fn owner() -> Principal {
    Principal {
        id: Uuid::from_u128(0x11111111_2222_3333_4444_555555555555),
        email: Some("profe@example.com".to_string()),
    }
}

// =============================================================================
// FAKES
// =============================================================================

pub struct FakeIdentity {
    pub calls: AtomicUsize,
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn resolve_user(&self, token: &str) -> Result<Principal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token == TOKEN {
            Ok(owner())
        } else {
            Err(Error::Unauthorized("Invalid or expired token".to_string()))
        }
    }
}

pub struct FakeAudioStore {
    pub puts: AtomicUsize,
    pub deletes: AtomicUsize,
    pub fail_put: bool,
}

#[async_trait]
impl AudioStore for FakeAudioStore {
    async fn put(
        &self,
        owner: &Principal,
        filename: &str,
        _content_type: &str,
        _bytes: &[u8],
    ) -> Result<AudioAsset> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_put {
            return Err(Error::Storage("bucket unreachable".to_string()));
        }
        let key = format!("{}/1_{}", owner.id, filename);
        Ok(AudioAsset {
            owner_id: owner.id,
            public_url: format!("https://storage.test/object/public/audio-notes/{}", key),
            storage_key: key,
        })
    }

    async fn delete(&self, _storage_key: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// What the fake transcriber does when asked.
#[derive(Clone, Copy)]
pub enum TranscribeOutcome {
    Text(&'static str),
    Empty,
    Fail,
}

pub struct FakeTranscriber {
    pub calls: AtomicUsize,
    pub outcome: TranscribeOutcome,
}

#[async_trait]
impl TranscriptionService for FakeTranscriber {
    async fn transcribe(&self, _bytes: &[u8]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            TranscribeOutcome::Text(text) => Ok(text.to_string()),
            TranscribeOutcome::Empty => Err(Error::EmptyTranscript),
            TranscribeOutcome::Fail => Err(Error::Transcription("stt exploded".to_string())),
        }
    }
}

pub struct FakeTitles {
    pub calls: AtomicUsize,
}

#[async_trait]
impl TitleGenerator for FakeTitles {
    async fn generate_title(&self, _text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(GENERATED_TITLE.to_string())
    }
}

pub struct FakeNotes {
    pub inserts: AtomicUsize,
    pub fail_insert: bool,
    pub records: Mutex<Vec<NoteRecord>>,
}

#[async_trait]
impl NoteStore for FakeNotes {
    async fn insert(&self, owner: &Principal, note: NewNote) -> Result<NoteRecord> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(Error::Internal("insert failed".to_string()));
        }
        let record = NoteRecord {
            id: Uuid::new_v4(),
            owner_id: owner.id,
            title: note.title,
            text: note.text,
            note_type: note.note_type,
            audio_url: note.audio_url,
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get(&self, owner: &Principal, id: Uuid) -> Result<NoteRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.owner_id == owner.id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    async fn list(&self, owner: &Principal) -> Result<Vec<NoteRecord>> {
        let mut notes: Vec<NoteRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.owner_id == owner.id)
            .cloned()
            .collect();
        notes.reverse(); // newest first
        Ok(notes)
    }

    async fn delete(&self, owner: &Principal, id: Uuid) -> Result<()> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !(r.id == id && r.owner_id == owner.id));
        if records.len() == before {
            return Err(Error::NotFound(format!("Note {} not found", id)));
        }
        Ok(())
    }
}

// =============================================================================
// TEST ENVIRONMENT
// =============================================================================

pub struct TestEnv {
    pub identity: Arc<FakeIdentity>,
    pub audio: Arc<FakeAudioStore>,
    pub transcriber: Arc<FakeTranscriber>,
    pub titles: Arc<FakeTitles>,
    pub notes: Arc<FakeNotes>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::build(TranscribeOutcome::Text(TRANSCRIPT), false, false)
    }

    pub fn with_transcriber(outcome: TranscribeOutcome) -> Self {
        Self::build(outcome, false, false)
    }

    pub fn with_failing_put() -> Self {
        Self::build(TranscribeOutcome::Text(TRANSCRIPT), true, false)
    }

    pub fn with_failing_insert() -> Self {
        Self::build(TranscribeOutcome::Text(TRANSCRIPT), false, true)
    }

    fn build(outcome: TranscribeOutcome, fail_put: bool, fail_insert: bool) -> Self {
        Self {
            identity: Arc::new(FakeIdentity {
                calls: AtomicUsize::new(0),
            }),
            audio: Arc::new(FakeAudioStore {
                puts: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
                fail_put,
            }),
            transcriber: Arc::new(FakeTranscriber {
                calls: AtomicUsize::new(0),
                outcome,
            }),
            titles: Arc::new(FakeTitles {
                calls: AtomicUsize::new(0),
            }),
            notes: Arc::new(FakeNotes {
                inserts: AtomicUsize::new(0),
                fail_insert,
                records: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn router(&self) -> Router {
        app(AppState {
            identity: self.identity.clone(),
            audio_store: self.audio.clone(),
            transcriber: self.transcriber.clone(),
            titles: self.titles.clone(),
            notes: self.notes.clone(),
            rate_limiter: None,
        })
    }
}

// =============================================================================
// REQUEST HELPERS
// =============================================================================

pub fn json_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/notes")
        .header("authorization", format!("Bearer {}", TOKEN))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", TOKEN))
        .body(Body::empty())
        .unwrap()
}

/// Hand-rolled multipart body: optional `title`/`type` text fields plus one
/// file part named `file` carrying fake MP3 bytes.
pub fn multipart_audio_body(title: Option<&str>, note_type: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    let mut text_field = |name: &str, value: &str| {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                MULTIPART_BOUNDARY, name, value
            )
            .as_bytes(),
        );
    };
    if let Some(value) = title {
        text_field("title", value);
    }
    if let Some(value) = note_type {
        text_field("type", value);
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"aula.mp3\"\r\n\
             Content-Type: audio/mpeg\r\n\r\n",
            MULTIPART_BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"ID3fakeaudiobytes");
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/notes")
        .header("authorization", format!("Bearer {}", TOKEN))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Read a response body into JSON.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
