//! Wire formats of the GitHub REST and GraphQL APIs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Issue, RepositoryDetails, RepositorySummary, TreeFile};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchReposResponse {
    #[serde(default)]
    pub items: Vec<ApiSearchRepo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSearchRepo {
    pub id: u64,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub stargazers_count: u64,
    pub html_url: Option<String>,
}

impl From<ApiSearchRepo> for RepositorySummary {
    fn from(repo: ApiSearchRepo) -> Self {
        Self {
            id: repo.id,
            full_name: repo.full_name,
            description: repo.description,
            language: repo.language,
            topics: repo.topics,
            stars: repo.stargazers_count,
            html_url: repo.html_url,
            relevance_score: None,
            relevance_reasoning: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepo {
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub default_branch: Option<String>,
}

impl From<ApiRepo> for RepositoryDetails {
    fn from(repo: ApiRepo) -> Self {
        Self {
            full_name: repo.full_name,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            default_branch: repo.default_branch.unwrap_or_else(|| "main".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn into_blob(self) -> Option<TreeFile> {
        (self.kind == "blob").then_some(TreeFile {
            path: self.path,
            size: self.size,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentResponse {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub content: Option<String>,
    pub encoding: Option<String>,
    pub download_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUserRepo {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    pub description: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIssue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLabel {
    pub name: String,
}

impl From<ApiIssue> for Issue {
    fn from(issue: ApiIssue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            html_url: issue.html_url,
            state: issue.state,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            comments: issue.comments,
            created_at: issue.created_at,
        }
    }
}

// ─── GraphQL ─────────────────────────────────────────────

pub(crate) const CONTRIBUTIONS_QUERY: &str = "query($login: String!) { \
     user(login: $login) { contributionsCollection { contributionCalendar { \
     totalContributions weeks { contributionDays { contributionCount } } } } } }";

#[derive(Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: LoginVariables<'a>,
}

#[derive(Serialize)]
pub(crate) struct LoginVariables<'a> {
    pub login: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<GraphQlData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlData {
    pub user: Option<GraphQlUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQlUser {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContributionCalendar {
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContributionWeek {
    #[serde(default)]
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContributionDay {
    pub contribution_count: u32,
}

impl ContributionCalendar {
    /// Daily counts, oldest first.
    pub fn daily_counts(&self) -> Vec<u32> {
        self.weeks
            .iter()
            .flat_map(|w| w.contribution_days.iter().map(|d| d.contribution_count))
            .collect()
    }
}
