//! Gemini gateway
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompts::{
    analysis_prompt, analysis_response_schema, ANALYSIS_SYSTEM_INSTRUCTION,
    COUNSELOR_SYSTEM_INSTRUCTION,
};
use super::{AiGateway, Analysis};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{ChatMessage, ChatRole};

/// Gateway backed by a hosted Gemini model
pub struct GeminiGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiGateway {
    /// Create a gateway from configuration. Requires an API key.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GatewayError::MissingCredential)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: endpoint_url(&config.api_base, &config.model),
            api_key,
        })
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, GatewayError> {
        tracing::debug!(endpoint = %self.endpoint, turns = request.contents.len(), "gateway request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "gateway returned error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        Ok(payload.text())
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    async fn analyze(&self, score: u32) -> Result<Analysis, GatewayError> {
        let text = self.generate(&build_analysis_request(score)).await?;
        parse_analysis_text(&text)
    }

    async fn chat(&self, message: &str, prior: &[ChatMessage]) -> Result<String, GatewayError> {
        self.generate(&build_chat_request(message, prior)).await
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

fn endpoint_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        api_base.trim_end_matches('/'),
        model
    )
}

/// Blank model output is an empty response rather than malformed JSON
fn parse_analysis_text(text: &str) -> Result<Analysis, GatewayError> {
    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResponse);
    }
    Analysis::from_model_json(text)
}

fn build_analysis_request(score: u32) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content::text(None, ANALYSIS_SYSTEM_INSTRUCTION)),
        contents: vec![Content::text(Some(ChatRole::User), &analysis_prompt(score))],
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: analysis_response_schema(),
        }),
    }
}

/// Multi-turn request: prior transcript followed by the new user message.
///
/// Model turns before the first user turn (the greeting) are dropped because
/// the conversation sent to the model must open with a user turn.
fn build_chat_request(message: &str, prior: &[ChatMessage]) -> GenerateContentRequest {
    let mut contents: Vec<Content> = prior
        .iter()
        .skip_while(|m| m.role == ChatRole::Model)
        .filter(|m| !m.content.trim().is_empty())
        .map(|m| Content::text(Some(m.role), &m.content))
        .collect();
    contents.push(Content::text(Some(ChatRole::User), message));

    GenerateContentRequest {
        system_instruction: Some(Content::text(None, COUNSELOR_SYSTEM_INSTRUCTION)),
        contents,
        generation_config: None,
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<ChatRole>, text: &str) -> Self {
        Self {
            role: role.map(|r| r.as_str().to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate (empty if none)
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}
