//! Process configuration.
//!
//! All credentials and endpoints are read from the environment exactly once,
//! at startup, into one [`AppConfig`] that is passed into each component.
//! Business logic never performs ambient environment lookups.
//!
//! Required variables: `IDENTITY_BASE_URL`, `IDENTITY_ANON_KEY`,
//! `STORAGE_BASE_URL`, `STORAGE_SERVICE_KEY`, `TRANSCRIBE_API_KEY`,
//! `TITLES_API_KEY`. Everything else has a default.

use std::time::Duration;

use crate::{Error, Result};

/// HTTP server binding and rate limiting.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period: Duration,
}

/// Identity service (bearer-token resolution).
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: String,
    /// Project-level key sent alongside the user token.
    pub anon_key: String,
}

/// Object storage bucket for raw audio.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub service_key: String,
    pub bucket: String,
}

/// Speech-to-text service and poll loop bounds.
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    pub base_url: String,
    pub api_key: String,
    /// Source-language hint sent on job creation.
    pub language: String,
    /// Fixed interval between status polls.
    pub poll_interval: Duration,
    /// Overall deadline for reaching a terminal status.
    pub deadline: Duration,
}

/// Language-model service for title synthesis.
#[derive(Debug, Clone)]
pub struct TitleConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Complete process configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database_url: String,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub transcription: TranscriptionConfig,
    pub titles: TitleConfig,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Separated from [`AppConfig::from_env`] so tests can supply variables
    /// without mutating process-global state.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            match lookup(name) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(Error::Config(format!("{} is not set", name))),
            }
        };
        let or_default =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let parsed_u64 = |name: &str, default: u64| -> u64 {
            lookup(name)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        let parsed_u32 = |name: &str, default: u32| -> u32 {
            lookup(name)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        // Parsed as u16 directly so out-of-range ports fall back instead of
        // truncating to an unexpected value.
        let parsed_u16 = |name: &str, default: u16| -> u16 {
            lookup(name)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        let parsed_bool = |name: &str, default: bool| -> bool {
            lookup(name)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        };

        Ok(Self {
            server: ServerConfig {
                host: or_default("HOST", "0.0.0.0"),
                port: parsed_u16("PORT", 3000),
                rate_limit_enabled: parsed_bool("RATE_LIMIT_ENABLED", true),
                rate_limit_requests: parsed_u32("RATE_LIMIT_REQUESTS", 100),
                rate_limit_period: Duration::from_secs(parsed_u64("RATE_LIMIT_PERIOD_SECS", 60)),
            },
            database_url: or_default("DATABASE_URL", "postgres://localhost/notavoz"),
            identity: IdentityConfig {
                base_url: required("IDENTITY_BASE_URL")?,
                anon_key: required("IDENTITY_ANON_KEY")?,
            },
            storage: StorageConfig {
                base_url: required("STORAGE_BASE_URL")?,
                service_key: required("STORAGE_SERVICE_KEY")?,
                bucket: or_default("STORAGE_BUCKET", "audio-notes"),
            },
            transcription: TranscriptionConfig {
                base_url: or_default("TRANSCRIBE_BASE_URL", "https://api.assemblyai.com/v2"),
                api_key: required("TRANSCRIBE_API_KEY")?,
                language: or_default("TRANSCRIBE_LANGUAGE", "pt"),
                poll_interval: Duration::from_secs(parsed_u64(
                    "TRANSCRIBE_POLL_INTERVAL_SECS",
                    3,
                )),
                deadline: Duration::from_secs(parsed_u64("TRANSCRIBE_DEADLINE_SECS", 600)),
            },
            titles: TitleConfig {
                base_url: or_default("TITLES_BASE_URL", "https://openrouter.ai/api/v1"),
                api_key: required("TITLES_API_KEY")?,
                model: or_default("TITLES_MODEL", "openai/gpt-3.5-turbo"),
                max_tokens: parsed_u32("TITLES_MAX_TOKENS", 32),
            },
        })
    }
}
