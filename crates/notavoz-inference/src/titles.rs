//! Title synthesis via an OpenAI-compatible chat completions API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use notavoz_core::{Error, Result, TitleConfig, TitleGenerator};

/// Fixed system instruction for title synthesis.
pub const TITLE_SYSTEM_PROMPT: &str = "You write titles for a teacher's voice notes. \
Reply with a concise title of at most five words for the text provided. \
Reply with the title only, without quotes or trailing punctuation.";

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Trim the model reply down to a usable one-line title.
///
/// Models like to wrap short answers in quotes; strip one matching pair and
/// keep only the first line.
fn clean_title(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("").trim();
    let unquoted = first_line
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            first_line
                .strip_prefix('\u{201c}')
                .and_then(|s| s.strip_suffix('\u{201d}'))
        })
        .unwrap_or(first_line);
    unquoted.trim().to_string()
}

/// Chat-completions client used for title synthesis.
pub struct ChatTitleGenerator {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl ChatTitleGenerator {
    pub fn new(config: &TitleConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client: reqwest::Client::new(),
        }
    }

    /// One chat completion: system prompt + user text, bounded output.
    pub async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TitleGeneration(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TitleGeneration(format!(
                "Completions API returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::TitleGeneration(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::TitleGeneration("Response contained no choices".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "titles",
            op = "complete",
            model = %self.model,
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Completion finished"
        );
        Ok(content)
    }
}

#[async_trait]
impl TitleGenerator for ChatTitleGenerator {
    async fn generate_title(&self, text: &str) -> Result<String> {
        let content = self
            .complete(TITLE_SYSTEM_PROMPT, text, self.max_tokens)
            .await?;
        let title = clean_title(&content);
        if title.is_empty() {
            warn!(
                subsystem = "inference",
                component = "titles",
                model = %self.model,
                "Model returned an empty title"
            );
            return Err(Error::TitleGeneration(
                "Model returned an empty title".to_string(),
            ));
        }
        Ok(title)
    }
}
