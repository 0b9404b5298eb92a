use async_trait::async_trait;

use crate::error::{FailureKind, Outcome};
use crate::models::{RepositorySummary, SearchPage};
use crate::search::merge::RankedResults;

/// Parameters handed to the repository index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub language: Option<String>,
    pub per_page: u32,
    pub page: u32,
}

/// The external repository index (GitHub search).
#[async_trait]
pub trait RepositorySearch: Send + Sync {
    async fn search_repositories(&self, query: &SearchQuery) -> anyhow::Result<Vec<RepositorySummary>>;
}

/// The external relevance ranker (an LLM). May score only a subset of the batch.
#[async_trait]
pub trait RelevanceRanker: Send + Sync {
    async fn rank(
        &self,
        repos: &[RepositorySummary],
        query: &str,
    ) -> anyhow::Result<Vec<crate::models::Ranking>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub language: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

/// Search one page, rank it, merge it into `results` and return the
/// relevance-ordered list.
///
/// Pipeline:
///   1. keyword search for `page` (failure is an error)
///   2. empty batch: stop, nothing to rank
///   3. LLM ranking of the batch (failure degrades to star order)
///   4. merge by repository id into the accumulated results
///   5. stable sort by relevance, unranked counting as 0
pub async fn fetch_and_rank(
    search: &dyn RepositorySearch,
    ranker: &dyn RelevanceRanker,
    results: &mut RankedResults,
    request: &SearchRequest,
) -> Result<Outcome<SearchPage>, FailureKind> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(FailureKind::MissingInput("query"));
    }

    let search_query = SearchQuery {
        keywords: query.split_whitespace().map(str::to_string).collect(),
        language: request.language.clone().filter(|l| !l.trim().is_empty()),
        per_page: request.per_page,
        page: request.page,
    };

    // ── Step 1: Search ────────────────────────────────────
    let batch = search
        .search_repositories(&search_query)
        .await
        .map_err(|e| FailureKind::upstream("repository search", e))?;

    tracing::info!(
        "Search '{query}' page {} returned {} repositories",
        request.page,
        batch.len()
    );

    // ── Step 2: Nothing to rank ───────────────────────────
    if batch.is_empty() {
        return Ok(Outcome::Complete(SearchPage {
            items: Vec::new(),
            has_more: false,
        }));
    }

    let has_more = batch.len() == request.per_page as usize;

    // ── Step 3: Rank ──────────────────────────────────────
    match ranker.rank(&batch, query).await {
        Ok(rankings) => {
            tracing::info!("Ranked {} of {} repositories", rankings.len(), batch.len());

            // ── Step 4: Merge by id ───────────────────────
            results.absorb(batch);
            results.overlay(&rankings);

            // ── Step 5: Sort ──────────────────────────────
            Ok(Outcome::Complete(SearchPage {
                items: results.ranked(),
                has_more,
            }))
        }
        Err(e) => {
            tracing::warn!("Ranking failed, falling back to star order: {e:#}");
            results.absorb(batch.clone());
            Ok(Outcome::Degraded {
                value: SearchPage {
                    items: sort_by_stars(batch),
                    has_more,
                },
                cause: FailureKind::upstream("relevance ranking", e),
            })
        }
    }
}

/// Most starred first; equal star counts keep their search order.
pub fn sort_by_stars(mut repos: Vec<RepositorySummary>) -> Vec<RepositorySummary> {
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));
    repos
}
