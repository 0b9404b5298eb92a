use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::analyze::analyze_repository;
use crate::error::FailureKind;
use crate::github::RepoRef;
use crate::llm::diagram::generate_architecture_diagram;
use crate::models::{
    AnalyzeResponse, IssueParams, IssuesResponse, ReadmeRequest, ReadmeResponse, RepoParams,
    VisualizeResponse,
};
use crate::readme::generate_readme;
use crate::state::AppState;

const MAX_ISSUES_PER_PAGE: u32 = 100;

/// GET /api/analyze-repo - One-sentence summaries of a repository's source files
pub async fn analyze_repo(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    let repo = RepoRef::parse(&params.repo)?;
    let key = repo.full_name().to_lowercase();
    if let Some(cached) = state.summaries.get(&key) {
        tracing::debug!("Serving cached analysis of {repo}");
        return Ok(Json(cached));
    }

    let response = analyze_repository(
        state.github.as_ref(),
        &state.llm,
        &repo,
        state.config.analyze_max_files,
    )
    .await?;
    // Empty results are not cached: the repository may gain files
    if !response.summaries.is_empty() {
        state.summaries.insert(key, response.clone());
    }
    Ok(Json(response))
}

/// POST /api/generate-readme - Draft a README from the repository's files
pub async fn generate_readme_handler(
    State(state): State<AppState>,
    Json(req): Json<ReadmeRequest>,
) -> Result<Json<ReadmeResponse>, (StatusCode, String)> {
    let repo = RepoRef::parse(&req.repo)?;
    let github = state.github.with_token(req.github_token.as_deref());
    let markdown = generate_readme(&github, &state.llm, &repo, req.user_notes.as_deref()).await?;
    Ok(Json(ReadmeResponse { markdown }))
}

/// GET /api/visualize-repo - Architecture flowchart derived from the README
pub async fn visualize_repo(
    State(state): State<AppState>,
    Query(params): Query<RepoParams>,
) -> Result<Json<VisualizeResponse>, (StatusCode, String)> {
    let repo = RepoRef::parse(&params.repo)?;
    let key = repo.full_name().to_lowercase();
    if let Some(cached) = state.diagrams.get(&key) {
        return Ok(Json(cached));
    }

    let readme = state
        .github
        .get_readme(&repo)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;
    let generated = generate_architecture_diagram(&state.llm, &readme, &repo.full_name())
        .await
        .map_err(|e| FailureKind::upstream("diagram generation", e))?;
    if generated.graph.is_empty() {
        return Err(FailureKind::EmptyResponse("diagram generation").into());
    }

    let response = VisualizeResponse {
        diagram: generated.text,
        graph: generated.graph,
    };
    state.diagrams.insert(key, response.clone());
    Ok(Json(response))
}

/// GET /api/issues - Issues of a repository filtered by labels and state
pub async fn list_issues(
    State(state): State<AppState>,
    Query(params): Query<IssueParams>,
) -> Result<Json<IssuesResponse>, (StatusCode, String)> {
    let repo = RepoRef::parse(&params.repo)?;
    let page = params.page.max(1);
    let per_page = params.per_page.clamp(1, MAX_ISSUES_PER_PAGE);

    let issues = state
        .github
        .list_issues(&repo, params.state, params.labels.as_deref(), page, per_page)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;
    tracing::info!("Fetched {} {} issues of {repo}", issues.len(), params.state.as_str());

    Ok(Json(IssuesResponse::new(issues, page, per_page)))
}
