use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repository as returned by search, optionally scored for relevance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositorySummary {
    /// Stable GitHub identity; the merge key across pages and rankings.
    pub id: u64,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub stars: u64,
    pub html_url: Option<String>,
    pub relevance_score: Option<f32>,
    pub relevance_reasoning: Option<String>,
}

impl RepositorySummary {
    /// Score used for ordering; unranked entries sort as 0.
    pub fn sort_score(&self) -> f32 {
        self.relevance_score.unwrap_or(0.0)
    }
}

/// One scored entry from the ranking collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ranking {
    pub id: u64,
    pub relevance_score: f32,
    pub relevance_reasoning: Option<String>,
}

/// A page of search results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchPage {
    pub items: Vec<RepositorySummary>,
    /// True when the last batch was a full page. A heuristic: GitHub does
    /// not say whether another page exists, so the final page may be empty.
    pub has_more: bool,
}

/// Search query string parameters (`/api/search-repos`)
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
    pub language: Option<String>,
    /// Returned by page 1; required on later pages.
    pub search_id: Option<Uuid>,
}

/// Trending search parameters (`/api/search-trending-repos`)
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingParams {
    pub filter: Option<String>,
    pub language: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    pub search_id: Option<Uuid>,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Identifies this caller's accumulated results. Send it back with
    /// `page` > 1 to load more.
    pub search_id: Uuid,
    /// Everything accumulated so far, ranked.
    pub items: Vec<RepositorySummary>,
    /// True when the last batch was a full page. A heuristic, not an
    /// authoritative count: GitHub does not say whether another page
    /// exists, so the next page may come back empty.
    pub has_more: bool,
    /// Set when ranking failed and results fell back to star order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

fn default_page() -> u32 {
    1
}

/// Public GitHub profile fields used for comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LanguageCount {
    pub language: String,
    pub repos: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopRepo {
    pub name: String,
    pub stars: u64,
    pub language: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Statistics derived from a user's public repositories and contribution calendar.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub total_stars: u64,
    pub total_forks: u64,
    /// Repos per primary language, most used first.
    pub languages: Vec<LanguageCount>,
    /// Contributions in the last year (0 when no token is configured).
    pub contributions: u64,
    /// Daily contribution counts, oldest first.
    pub contribution_calendar: Vec<u32>,
    /// Up to five repos, most starred first.
    pub top_repos: Vec<TopRepo>,
}

impl UserStats {
    pub fn total_commits(&self) -> u64 {
        self.contribution_calendar.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn top_languages(&self, n: usize) -> Vec<String> {
        self.languages.iter().take(n).map(|l| l.language.clone()).collect()
    }
}

/// Profile and stats fetched together for one comparison session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSnapshot {
    pub profile: UserProfile,
    pub stats: UserStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserParams {
    #[serde(default)]
    pub username: String,
}

/// Compare request
#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub user1: String,
    #[serde(default)]
    pub user2: String,
}

/// Query parameter naming a repository as `owner/name`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoParams {
    #[serde(default)]
    pub repo: String,
}

/// Repository metadata needed to walk its files and describe it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepositoryDetails {
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub default_branch: String,
}

/// A blob in a repository tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeFile {
    pub path: String,
    /// Bytes, when GitHub reports it.
    pub size: Option<u64>,
}

impl TreeFile {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A file's path with a one-sentence description of its role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSummary {
    pub path: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub summaries: Vec<FileSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// README generation request
#[derive(Debug, Clone, Deserialize)]
pub struct ReadmeRequest {
    #[serde(default)]
    pub repo: String,
    /// Overrides the server token, e.g. for private repositories.
    pub github_token: Option<String>,
    pub user_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadmeResponse {
    pub markdown: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisualizeResponse {
    pub diagram: String,
    pub graph: crate::diagram::DiagramGraph,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    pub labels: Vec<String>,
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueParams {
    #[serde(default)]
    pub repo: String,
    pub labels: Option<String>,
    #[serde(default)]
    pub state: IssueState,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_issue_page_size")]
    pub per_page: u32,
}

fn default_issue_page_size() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuesResponse {
    pub issues: Vec<Issue>,
    /// Rough: GitHub gives no total without walking every page.
    pub estimated_total: usize,
    pub page: u32,
    pub per_page: u32,
    pub has_more: bool,
}

impl IssuesResponse {
    pub fn new(issues: Vec<Issue>, page: u32, per_page: u32) -> Self {
        let full_page = issues.len() == per_page as usize;
        let estimated_total = if full_page {
            issues.len().max(per_page as usize * 2)
        } else {
            issues.len()
        };
        Self {
            issues,
            estimated_total,
            page,
            per_page,
            has_more: full_page,
        }
    }
}

/// LLM config update request
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfigUpdate {
    pub provider: Option<String>,
    // base_url intentionally omitted: immutable at runtime to prevent SSRF
    pub chat_model: Option<String>,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
}
