use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::config::LlmConfig;
use crate::models::LlmConfigUpdate;
use crate::state::AppState;

const PROVIDERS: &[&str] = &["gemini", "ollama", "openai"];

/// Config response with API key redacted
#[derive(Serialize)]
pub struct LlmConfigResponse {
    pub provider: String,
    pub base_url: String,
    pub chat_model: String,
    pub temperature: f32,
    pub has_api_key: bool,
}

impl From<&LlmConfig> for LlmConfigResponse {
    fn from(config: &LlmConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            base_url: config.base_url.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            has_api_key: config.api_key.is_some(),
        }
    }
}

/// GET /api/config - Current LLM config
pub async fn get_config(State(state): State<AppState>) -> Json<LlmConfigResponse> {
    let config = state.llm_config.read();
    Json(LlmConfigResponse::from(&*config))
}

/// PUT /api/config - Update LLM config
pub async fn update_config(
    State(state): State<AppState>,
    Json(update): Json<LlmConfigUpdate>,
) -> Result<Json<LlmConfigResponse>, (StatusCode, String)> {
    if let Some(provider) = &update.provider {
        if !PROVIDERS.contains(&provider.as_str()) {
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unknown provider '{provider}'; expected one of {}", PROVIDERS.join(", ")),
            ));
        }
    }
    if let Some(temperature) = update.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err((
                StatusCode::BAD_REQUEST,
                "Temperature must be between 0 and 2".to_string(),
            ));
        }
    }

    let mut config = state.llm_config.write();
    if let Some(provider) = update.provider {
        config.provider = provider;
    }
    // base_url is immutable at runtime (set via LLM_BASE_URL env var only)
    // to prevent SSRF: an attacker changing it could exfiltrate the API key
    if let Some(chat_model) = update.chat_model {
        config.chat_model = chat_model;
    }
    if let Some(api_key) = update.api_key {
        config.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
    }
    if let Some(temperature) = update.temperature {
        config.temperature = temperature;
    }
    tracing::info!("LLM config updated: {} / {}", config.provider, config.chat_model);

    Ok(Json(LlmConfigResponse::from(&*config)))
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
