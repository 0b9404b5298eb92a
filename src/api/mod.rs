pub mod config;
pub mod repos;
pub mod search;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search-repos", get(search::search_repos))
        .route("/api/search-trending-repos", get(search::search_trending))
        .route("/api/analyze-repo", get(repos::analyze_repo))
        .route("/api/generate-readme", post(repos::generate_readme_handler))
        .route("/api/visualize-repo", get(repos::visualize_repo))
        .route("/api/issues", get(repos::list_issues))
        .route("/api/github-user", get(users::github_user))
        .route("/api/compare", post(users::compare_users))
        .route("/api/config", get(config::get_config).put(config::update_config))
        .route("/api/health", get(config::health))
        .with_state(state)
}
