//! # notavoz-inference
//!
//! External AI service clients for notavoz.
//!
//! This crate provides:
//! - The speech-to-text submit/poll client ([`PollingTranscriber`])
//! - The chat-completions title generator ([`ChatTitleGenerator`])
//!
//! Both implement the service traits defined in `notavoz-core`, so the API
//! layer only ever sees `TranscriptionService` and `TitleGenerator`.

pub mod titles;
pub mod transcription;

// Re-export core types
pub use notavoz_core::*;

pub use titles::{ChatTitleGenerator, TITLE_SYSTEM_PROMPT};
pub use transcription::{JobStatus, PollingTranscriber};
