//! Chat-completions client for OpenAI-compatible APIs.
//!
//! Speaks the `POST {base_url}/chat/completions` protocol with a bearer key.
//! HTTP statuses are mapped onto [`GenerationError`] so the retrying
//! generation service can decide what is worth another attempt.

use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use dockgen_core::{
    application::ports::{GenerationClient, GenerationError},
    domain::GenerationRequest,
    error::{DockgenError, DockgenResult},
};

/// Longest slice of an error body carried into messages.
const MAX_ERROR_BODY: usize = 200;

/// Connection settings for [`OpenAiClient`].
#[derive(Clone, PartialEq)]
pub struct OpenAiSettings {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub model: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Blocking chat-completions client.
pub struct OpenAiClient {
    settings: OpenAiSettings,
    http: Client,
}

impl OpenAiClient {
    pub fn new(settings: OpenAiSettings) -> DockgenResult<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("dockgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DockgenError::configuration(format!("Cannot build HTTP client: {e}")))?;

        Ok(Self { settings, http })
    }

    pub fn settings(&self) -> &OpenAiSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("settings", &self.settings)
            .finish()
    }
}

impl GenerationClient for OpenAiClient {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        debug!(
            artifact = %request.artifact,
            prompt_chars = request.user.len(),
            model = %self.settings.model,
            "Sending chat completion request"
        );
        let start = Instant::now();

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .map_err(|e| map_transport_error(&e, self.settings.timeout))?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let text = response.text().map_err(|e| GenerationError::Transport {
            message: format!("failed to read response body: {e}"),
        })?;

        if !(200..300).contains(&status) {
            let error = map_status(status, retry_after, &text);
            warn!(status, error = %error, "Generation API returned an error");
            return Err(error);
        }

        let content = extract_content(&text)?;
        info!(
            artifact = %request.artifact,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = content.len(),
            "Chat completion received"
        );
        Ok(content)
    }
}

// -----------------------------------------------------------------------------
// Wire format
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// -----------------------------------------------------------------------------
// Mapping
// -----------------------------------------------------------------------------

fn map_transport_error(e: &reqwest::Error, timeout: Duration) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout {
            message: format!("no answer within {}s", timeout.as_secs()),
        }
    } else if e.is_connect() {
        GenerationError::Transport {
            message: format!("connection failed: {e}"),
        }
    } else {
        GenerationError::Transport {
            message: e.to_string(),
        }
    }
}

/// Seconds form of `Retry-After`; the HTTP-date form is ignored.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn map_status(status: u16, retry_after: Option<Duration>, body: &str) -> GenerationError {
    match status {
        429 => GenerationError::RateLimited { retry_after },
        401 | 403 => GenerationError::Authentication { status },
        408 | 504 => GenerationError::Timeout {
            message: format!("HTTP {status}"),
        },
        _ => GenerationError::Api {
            status,
            message: error_message(body),
        },
    }
}

fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_owned(),
    }
}

fn extract_content(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse {
            message: format!("JSON parse error: {e}"),
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| GenerationError::InvalidResponse {
            message: "no content in the first choice".into(),
        })
}
