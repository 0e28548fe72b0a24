//! Structured completion: resume text in, schema-conformant JSON out.
//!
//! [`StructuredExtractor`] is the seam between the pipeline and the remote
//! model. The production implementation, [`OpenAiExtractor`], calls an
//! OpenAI-compatible `/chat/completions` endpoint with a strict
//! `json_schema` response format, so the service itself enforces the shape;
//! this module only checks that the answer is a JSON object and reads the
//! `full_name` the pipeline needs. Everything else is left to the schema.
//!
//! No retries happen here. Every failure is reported once, classified by
//! HTTP status into auth / rate-limit / timeout / generic API errors.

use crate::config::ParserConfig;
use crate::error::ResumeParserError;
use crate::prompts::{resume_user_message, DEFAULT_SYSTEM_PROMPT};
use crate::schema::{null_as_default, ResumeSchema};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

// ── Credential ───────────────────────────────────────────────────────────

/// The API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Explicit key first, then `env_var`; blank values count as missing.
    pub fn resolve(explicit: Option<&str>, env_var: &str) -> Result<Self, ResumeParserError> {
        explicit
            .map(str::to_string)
            .or_else(|| std::env::var(env_var).ok())
            .filter(|k| !k.trim().is_empty())
            .map(Self)
            .ok_or_else(|| ResumeParserError::MissingCredential {
                env_var: env_var.to_string(),
            })
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ── Extraction result ────────────────────────────────────────────────────

/// A structured result and the exact JSON text it was parsed from.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// `full_name` from the answer; empty when the model left it out or null.
    pub full_name: String,
    pub raw_json: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The only field the pipeline itself reads from an answer.
#[derive(Deserialize)]
struct NameOnly {
    #[serde(default, deserialize_with = "null_as_default")]
    full_name: String,
}

impl Extraction {
    /// Check that `raw_json` is a JSON object and pull out its `full_name`.
    ///
    /// The rest of the object is not interpreted here, so custom schemas
    /// with their own field shapes pass through untouched.
    pub fn from_raw_json(raw_json: impl Into<String>) -> Result<Self, ResumeParserError> {
        let raw_json = raw_json.into();
        let name: NameOnly = serde_json::from_str(&raw_json)
            .map_err(|e| ResumeParserError::SchemaViolation { detail: e.to_string() })?;
        Ok(Self {
            full_name: name.full_name,
            raw_json,
            input_tokens: 0,
            output_tokens: 0,
        })
    }

    pub fn with_usage(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }
}

/// Fills a [`ResumeSchema`] from raw resume text.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(
        &self,
        resume_text: &str,
        schema: &ResumeSchema,
        credential: &Credential,
    ) -> Result<Extraction, ResumeParserError>;
}

// ── OpenAI wire types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_completion_tokens: usize,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: std::borrow::Cow<'a, str>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ResponseFormat<'a> {
    #[serde(rename = "json_schema")]
    JsonSchema { json_schema: JsonSchemaDefinition<'a> },
}

#[derive(Debug, Serialize)]
struct JsonSchemaDefinition<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ── OpenAI extractor ─────────────────────────────────────────────────────

/// [`StructuredExtractor`] for OpenAI-compatible chat-completions endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiExtractor {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    timeout_secs: Option<u64>,
    system_prompt: String,
}

impl OpenAiExtractor {
    /// Build the client from the model/endpoint settings in `config`.
    pub fn from_config(config: &ParserConfig) -> Result<Self, ResumeParserError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ResumeParserError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.api_timeout_secs,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, resume_text: &'a str, schema: &'a ResumeSchema) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt.as_str().into(),
                },
                ChatMessage {
                    role: "user",
                    content: resume_user_message(resume_text).into(),
                },
            ],
            temperature: self.temperature,
            max_completion_tokens: self.max_tokens,
            response_format: ResponseFormat::JsonSchema {
                json_schema: JsonSchemaDefinition {
                    name: &schema.name,
                    strict: true,
                    schema: &schema.schema,
                },
            },
        }
    }
}

#[async_trait]
impl StructuredExtractor for OpenAiExtractor {
    async fn extract(
        &self,
        resume_text: &str,
        schema: &ResumeSchema,
        credential: &Credential,
    ) -> Result<Extraction, ResumeParserError> {
        let endpoint = self.endpoint();
        info!("Requesting structured completion: model={} endpoint={}", self.model, endpoint);

        let request = self.build_request(resume_text, schema);
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body, retry_after, &endpoint));
        }

        let extraction = parse_response(&body)?;
        debug!(
            "Structured completion: {} input tokens, {} output tokens, {} bytes",
            extraction.input_tokens,
            extraction.output_tokens,
            extraction.raw_json.len()
        );
        Ok(extraction)
    }
}

impl OpenAiExtractor {
    fn transport_error(&self, e: reqwest::Error) -> ResumeParserError {
        if e.is_timeout() {
            ResumeParserError::ApiTimeout {
                secs: self.timeout_secs.unwrap_or_default(),
            }
        } else {
            ResumeParserError::LlmApiError {
                message: e.to_string(),
            }
        }
    }
}

/// Map a non-2xx response onto the remote-service error variants.
fn classify_status(status: u16, body: &str, retry_after_secs: Option<u64>, endpoint: &str) -> ResumeParserError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().chars().take(300).collect());

    match status {
        401 | 403 => ResumeParserError::AuthError {
            endpoint: endpoint.to_string(),
            detail,
        },
        429 => ResumeParserError::RateLimitExceeded {
            endpoint: endpoint.to_string(),
            retry_after_secs,
        },
        _ => ResumeParserError::LlmApiError {
            message: format!("HTTP {}: {}", status, detail),
        },
    }
}

/// Pull the structured JSON out of a successful chat-completions body.
fn parse_response(body: &str) -> Result<Extraction, ResumeParserError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| ResumeParserError::LlmApiError {
        message: format!("Unexpected response body: {}", e),
    })?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ResumeParserError::LlmApiError {
            message: "Response contained no choices".into(),
        })?;

    if let Some(reason) = choice.message.refusal {
        return Err(ResumeParserError::Refusal { reason });
    }
    if choice.finish_reason.as_deref() == Some("length") {
        return Err(ResumeParserError::SchemaViolation {
            detail: "response was truncated at the token limit".into(),
        });
    }

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ResumeParserError::SchemaViolation {
            detail: "response has no content".into(),
        })?;

    let (input, output) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    Ok(Extraction::from_raw_json(content)?.with_usage(input, output))
}
