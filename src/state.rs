use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::config::{Config, LlmConfig};
use crate::github::GitHubClient;
use crate::llm::LlmClient;
use crate::models::{AnalyzeResponse, UserSnapshot, VisualizeResponse};
use crate::search::RankedResults;

/// Normalized query and language a search session was started with.
pub type SearchKey = (String, Option<String>);

/// One caller's "load more" accumulator. Pages of the same session run one
/// at a time under the async lock, so no page's merge is lost.
#[derive(Debug)]
pub struct SearchSession {
    pub key: SearchKey,
    pub results: RankedResults,
}

pub type SharedSearch = Arc<tokio::sync::Mutex<SearchSession>>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm_config: Arc<RwLock<LlmConfig>>,
    pub github: Arc<GitHubClient>,
    pub llm: LlmClient,
    /// File summaries per repository
    pub summaries: Arc<SessionCache<String, AnalyzeResponse>>,
    /// Profiles per lowercase login
    pub users: Arc<SessionCache<String, UserSnapshot>>,
    /// Architecture diagrams per repository
    pub diagrams: Arc<SessionCache<String, VisualizeResponse>>,
    /// "Load more" accumulators per search id handed out on page 1
    pub searches: Arc<SessionCache<Uuid, SharedSearch>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.http_timeout())
            .build()?;

        let llm_config = Arc::new(RwLock::new(config.llm.clone()));
        let github = GitHubClient::new(http_client.clone(), config.github.clone());
        let llm = LlmClient::new(http_client.clone(), llm_config.clone());

        Ok(Self {
            summaries: session_cache(&config),
            users: session_cache(&config),
            diagrams: session_cache(&config),
            searches: session_cache(&config),
            config,
            llm_config,
            github: Arc::new(github),
            llm,
        })
    }
}

fn session_cache<K, V>(config: &Config) -> Arc<SessionCache<K, V>>
where
    K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let cache = SessionCache::in_memory(config.eviction_policy());
    Arc::new(match config.cache_ttl() {
        Some(ttl) => cache.with_ttl(ttl),
        None => cache,
    })
}
