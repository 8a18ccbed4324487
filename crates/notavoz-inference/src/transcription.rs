//! Speech-to-text client: submit audio, then poll until a terminal status.
//!
//! The job lifecycle is a small state machine. Submission uploads the raw
//! bytes (`POST /upload`) and creates a job from the returned reference
//! (`POST /transcript`). The poll loop then reads `GET /transcript/{id}`
//! every `poll_interval` until the service reports `completed` or `error`,
//! or until the configured deadline elapses; there is no unbounded wait.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use notavoz_core::{Error, Result, TranscriptionConfig, TranscriptionService};

const SUBMIT_TIMEOUT_SECS: u64 = 120;
const POLL_TIMEOUT_SECS: u64 = 15;

/// Status reported by the speech-to-text service for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// A terminal status ends the poll loop; anything else means "poll again".
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Serialize)]
struct CreateJobRequest<'a> {
    audio_url: &'a str,
    language_code: &'a str,
}

#[derive(Deserialize)]
struct CreateJobResponse {
    id: String,
}

#[derive(Deserialize)]
struct JobStatusResponse {
    status: JobStatus,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Submit/poll client for an AssemblyAI-style transcription API.
pub struct PollingTranscriber {
    base_url: String,
    api_key: String,
    language: String,
    poll_interval: Duration,
    deadline: Duration,
    client: reqwest::Client,
}

impl PollingTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            poll_interval: config.poll_interval,
            deadline: config.deadline,
            client: reqwest::Client::new(),
        }
    }

    /// Upload the raw audio bytes and obtain an opaque reference.
    async fn upload_audio(&self, bytes: &[u8]) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .timeout(Duration::from_secs(SUBMIT_TIMEOUT_SECS))
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Upload returned {}: {}",
                status, body
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse upload response: {}", e)))?;
        Ok(upload.upload_url)
    }

    /// Create a transcription job for an uploaded audio reference.
    async fn create_job(&self, audio_url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS))
            .json(&CreateJobRequest {
                audio_url,
                language_code: &self.language,
            })
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Job creation failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Job creation returned {}: {}",
                status, body
            )));
        }

        let job: CreateJobResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse job response: {}", e)))?;
        Ok(job.id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobStatusResponse> {
        let response = self
            .client
            .get(format!("{}/transcript/{}", self.base_url, job_id))
            .header("authorization", &self.api_key)
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| Error::Transcription(format!("Status poll failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!(
                "Status poll returned {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("Failed to parse status response: {}", e)))
    }
}

#[async_trait]
impl TranscriptionService for PollingTranscriber {
    async fn transcribe(&self, bytes: &[u8]) -> Result<String> {
        let started = Instant::now();

        let upload_url = self.upload_audio(bytes).await?;
        let job_id = self.create_job(&upload_url).await?;
        debug!(
            subsystem = "inference",
            component = "transcription",
            op = "submit",
            job_id = %job_id,
            audio_bytes = bytes.len(),
            "Transcription job submitted"
        );

        let mut polls: u32 = 0;
        loop {
            let status = self.job_status(&job_id).await?;
            polls += 1;

            match status.status {
                JobStatus::Completed => {
                    let text = status.text.unwrap_or_default();
                    if text.trim().is_empty() {
                        // Silence or no detectable speech is a caller error,
                        // not an upstream failure.
                        return Err(Error::EmptyTranscript);
                    }
                    debug!(
                        subsystem = "inference",
                        component = "transcription",
                        op = "poll",
                        job_id = %job_id,
                        poll_count = polls,
                        duration_ms = started.elapsed().as_millis() as u64,
                        response_len = text.len(),
                        "Transcription complete"
                    );
                    return Ok(text);
                }
                JobStatus::Error => {
                    let detail = status
                        .error
                        .unwrap_or_else(|| "unknown upstream error".to_string());
                    warn!(
                        subsystem = "inference",
                        component = "transcription",
                        job_id = %job_id,
                        error = %detail,
                        "Transcription job failed"
                    );
                    return Err(Error::Transcription(detail));
                }
                JobStatus::Queued | JobStatus::Processing => {
                    if started.elapsed() >= self.deadline {
                        warn!(
                            subsystem = "inference",
                            component = "transcription",
                            job_id = %job_id,
                            poll_count = polls,
                            "Transcription deadline exceeded"
                        );
                        return Err(Error::TranscriptionTimeout(self.deadline.as_secs()));
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}
