//! # notavoz-core
//!
//! Core types, traits, and configuration for notavoz.
//!
//! This crate provides:
//! - The error taxonomy of the ingestion pipeline
//! - The data model (principals, ingestion requests, note records)
//! - Process configuration built once from the environment
//! - Service traits for identity, storage, transcription, titles, persistence
//! - Structured logging field constants
//! - UUIDv7 helpers for time-ordered identifiers

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod uuid_utils;

pub use config::{
    AppConfig, IdentityConfig, ServerConfig, StorageConfig, TitleConfig, TranscriptionConfig,
};
pub use error::{Error, Result};
pub use models::{
    AudioAsset, AudioUpload, CreateTextNoteRequest, IngestionRequest, NewNote, NoteRecord,
    Principal, TextUpload, NOTE_TYPE_AUDIO, NOTE_TYPE_TEXT,
};
pub use traits::{AudioStore, IdentityService, NoteStore, TitleGenerator, TranscriptionService};
pub use uuid_utils::new_v7;
