use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::FailureKind;
use crate::models::{SearchParams, SearchResponse, TrendingParams};
use crate::search::{fetch_and_rank, RankedResults, SearchRequest};
use crate::state::{AppState, SearchKey, SearchSession};

const DEFAULT_TRENDING_FILTER: &str = "good first issue";

/// GET /api/search-repos - Keyword search, LLM relevance ranking, and
/// "load more" accumulation across pages of one caller's search.
pub async fn search_repos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let language = params.language.filter(|l| !l.trim().is_empty());
    run_search(&state, params.query, language, params.page, params.search_id).await
}

/// GET /api/search-trending-repos - Same pipeline over a canned filter such
/// as "good first issue", with the language folded into the query text.
pub async fn search_trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let mut query = params
        .filter
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TRENDING_FILTER.to_string());
    if let Some(language) = params.language.filter(|l| !l.trim().is_empty()) {
        query.push_str(" language:");
        query.push_str(language.trim());
    }
    run_search(&state, query, None, params.page, params.search_id).await
}

async fn run_search(
    state: &AppState,
    query: String,
    language: Option<String>,
    page: u32,
    search_id: Option<Uuid>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    if query.trim().is_empty() {
        return Err(FailureKind::MissingInput("query").into());
    }
    let page = page.max(1);
    let key = search_key(&query, language.as_deref());

    // Page 1 starts a new search for this caller; later pages build on
    // what that caller was already shown
    let (search_id, session) = if page == 1 {
        if let Some(previous) = search_id {
            state.searches.remove(&previous);
        }
        let session = SearchSession {
            key: key.clone(),
            results: RankedResults::default(),
        };
        (Uuid::new_v4(), Arc::new(Mutex::new(session)))
    } else {
        let search_id = search_id.ok_or(FailureKind::MissingInput("search_id"))?;
        let session = state.searches.get(&search_id).ok_or_else(|| {
            FailureKind::NotFound(format!("search {search_id}; start again from page 1"))
        })?;
        (search_id, session)
    };

    let mut guard = session.lock().await;
    if guard.key != key {
        return Err(FailureKind::InvalidInput(format!(
            "search {search_id} was started for a different query"
        ))
        .into());
    }

    let request = SearchRequest {
        query,
        language,
        page,
        per_page: state.config.search_per_page,
    };
    let outcome =
        fetch_and_rank(state.github.as_ref(), &state.llm, &mut guard.results, &request).await?;
    drop(guard);
    state.searches.insert(search_id, session);

    let (page, degraded) = outcome.into_parts();
    Ok(Json(SearchResponse {
        search_id,
        items: page.items,
        has_more: page.has_more,
        degraded,
    }))
}

fn search_key(query: &str, language: Option<&str>) -> SearchKey {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    (normalized, language.map(|l| l.trim().to_lowercase()))
}
