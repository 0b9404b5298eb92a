use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::error::FailureKind;

/// Single-prompt text completion against the configured provider.
///
/// The config is shared with `/api/config`, so each call takes a snapshot
/// before going to the network.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    config: Arc<RwLock<LlmConfig>>,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, config: Arc<RwLock<LlmConfig>>) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> LlmConfig {
        self.config.read().clone()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let config = self.config();
        let text = match config.provider.as_str() {
            "gemini" => call_gemini(&self.http, &config, prompt).await?,
            "ollama" => call_ollama(&self.http, &config, prompt).await?,
            "openai" => call_openai(&self.http, &config, prompt).await?,
            other => {
                return Err(FailureKind::Config(format!("unknown LLM provider: {other}")).into())
            }
        };
        tracing::debug!(
            provider = %config.provider,
            chars = text.len(),
            "LLM completion received"
        );
        Ok(text)
    }
}

/// Prompt in, text out. The seam pipelines use so tests can script replies.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl TextCompletion for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        LlmClient::complete(self, prompt).await
    }
}

// ─── Gemini ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

async fn call_gemini(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        config.base_url, config.chat_model
    );
    let api_key = config
        .api_key
        .as_deref()
        .context("Gemini requires an API key (LLM_API_KEY or GEMINI_API_KEY)")?;

    let req = GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        },
    };

    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&req)
        .send()
        .await
        .context("Failed to call Gemini generateContent API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Gemini API returned {status}: {body}");
    }

    let body: GeminiResponse = resp
        .json()
        .await
        .context("Failed to parse Gemini response")?;
    Ok(body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .map(|p| p.text)
        .unwrap_or_default())
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

async fn call_ollama(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    let url = format!("{}/api/chat", config.base_url);

    let req = OllamaChatRequest {
        model: config.chat_model.clone(),
        messages: vec![OllamaMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        stream: false,
    };

    let resp = client
        .post(&url)
        .json(&req)
        .send()
        .await
        .context("Failed to call Ollama chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("Ollama chat API returned {status}: {body}");
    }

    let body: OllamaChatResponse = resp.json().await?;
    Ok(body.message.content)
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

async fn call_openai(client: &reqwest::Client, config: &LlmConfig, prompt: &str) -> Result<String> {
    let url = format!("{}/v1/chat/completions", config.base_url);
    let api_key = config.api_key.as_deref().unwrap_or_default();

    let req = OpenAiChatRequest {
        model: config.chat_model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }],
        temperature: config.temperature,
        max_tokens: config.max_output_tokens,
    };

    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&req)
        .send()
        .await
        .context("Failed to call OpenAI chat API")?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("OpenAI chat API returned {status}: {body}");
    }

    let body: OpenAiChatResponse = resp.json().await?;
    Ok(body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default())
}
