use std::time::Duration;

use serde::{Deserialize, Serialize};

const MIN_HTTP_TIMEOUT_SECS: u64 = 1;
const MAX_HTTP_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// GitHub API access
    pub github: GitHubConfig,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Repositories requested per search page
    pub search_per_page: u32,
    /// Maximum number of files summarized by repository analysis
    pub analyze_max_files: usize,
    /// Maximum entries per session cache (0 = never evict)
    pub cache_max_entries: usize,
    /// Lifetime of a session cache entry (0 = no expiry)
    pub cache_ttl_secs: u64,
    /// Total request timeout for outbound HTTP calls
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST base URL; GraphQL lives at `{api_url}/graphql`
    pub api_url: String,
    /// Personal access token. Without one, contribution counts are unavailable
    /// and rate limits are much lower.
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: "what-to-build".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini", "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for completions
    pub chat_model: String,
    /// API key (not needed for a local Ollama)
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            github: GitHubConfig::default(),
            llm: LlmConfig::default(),
            search_per_page: 10,
            analyze_max_files: 25,
            cache_max_entries: 0,
            cache_ttl_secs: 30 * 60,
            http_timeout_secs: 120,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            chat_model: "gemini-2.5-flash".to_string(),
            api_key: None,
            temperature: 0.3,
            max_output_tokens: 4096,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("WHAT_TO_BUILD_BIND_ADDR") {
            config.bind_addr = addr;
        }

        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            config.github.api_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.trim().is_empty() {
                config.github.token = Some(token);
            }
        }

        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        config.llm.api_key = ["LLM_API_KEY", "GEMINI_API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty())
            .or(config.llm.api_key);
        if let Ok(val) = std::env::var("LLM_TEMPERATURE") {
            if let Ok(v) = val.parse::<f32>() {
                config.llm.temperature = v.clamp(0.0, 2.0);
            }
        }

        if let Ok(val) = std::env::var("SEARCH_PER_PAGE") {
            if let Ok(v) = val.parse::<u32>() {
                config.search_per_page = v.clamp(1, 100); // GitHub's maximum
            }
        }
        if let Ok(val) = std::env::var("ANALYZE_MAX_FILES") {
            if let Ok(v) = val.parse() {
                config.analyze_max_files = v;
            }
        }
        if let Ok(val) = std::env::var("CACHE_MAX_ENTRIES") {
            if let Ok(v) = val.parse() {
                config.cache_max_entries = v;
            }
        }
        if let Ok(val) = std::env::var("CACHE_TTL_SECS") {
            if let Ok(v) = val.parse() {
                config.cache_ttl_secs = v;
            }
        }
        if let Ok(val) = std::env::var("HTTP_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.http_timeout_secs = v.clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS);
            }
        }

        config
    }

    pub fn eviction_policy(&self) -> crate::cache::EvictionPolicy {
        match self.cache_max_entries {
            0 => crate::cache::EvictionPolicy::Never,
            n => crate::cache::EvictionPolicy::MaxEntries(n),
        }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    /// Total timeout for outbound calls, never zero so a bad value cannot
    /// fail every request.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.http_timeout_secs
                .clamp(MIN_HTTP_TIMEOUT_SECS, MAX_HTTP_TIMEOUT_SECS),
        )
    }
}
