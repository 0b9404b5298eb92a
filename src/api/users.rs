use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::compare::{compare, Comparison, ProfileSource};
use crate::error::FailureKind;
use crate::models::{CompareRequest, UserParams, UserSnapshot};
use crate::state::AppState;

/// Profiles served from the session cache, fetched from GitHub on a miss.
struct CachedProfiles<'a> {
    state: &'a AppState,
}

#[async_trait]
impl ProfileSource for CachedProfiles<'_> {
    async fn fetch_snapshot(&self, username: &str) -> anyhow::Result<UserSnapshot> {
        let key = username.to_lowercase();
        if let Some(cached) = self.state.users.get(&key) {
            tracing::debug!("Serving cached profile of {username}");
            return Ok(cached);
        }
        let snapshot = self.state.github.fetch_snapshot(username).await?;
        self.state.users.insert(key, snapshot.clone());
        Ok(snapshot)
    }
}

/// GET /api/github-user - Profile and repository stats of one user
pub async fn github_user(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<Json<UserSnapshot>, (StatusCode, String)> {
    let username = params.username.trim();
    if username.is_empty() {
        return Err(FailureKind::MissingInput("username").into());
    }

    let snapshot = CachedProfiles { state: &state }
        .fetch_snapshot(username)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;
    Ok(Json(snapshot))
}

#[derive(Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub comparison: Comparison,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

/// POST /api/compare - Badges, winner and a roast for two users
pub async fn compare_users(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, (StatusCode, String)> {
    // A new comparison works from fresh snapshots
    for username in [&req.user1, &req.user2] {
        state.users.remove(&username.trim().to_lowercase());
    }
    let profiles = CachedProfiles { state: &state };
    let outcome = compare(&profiles, &state.llm, &req.user1, &req.user2).await?;
    let (comparison, degraded) = outcome.into_parts();
    Ok(Json(CompareResponse {
        comparison,
        degraded,
    }))
}
