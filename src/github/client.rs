use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::analyze::RepositoryFiles;
use crate::config::GitHubConfig;
use crate::error::FailureKind;
use crate::github::repo_ref::RepoRef;
use crate::github::types::{
    ApiIssue, ApiRepo, ApiUserRepo, ContentResponse, ContributionCalendar, GraphQlRequest,
    GraphQlResponse, LoginVariables, SearchReposResponse, TreeEntry, TreeResponse,
    CONTRIBUTIONS_QUERY,
};
use crate::models::{Issue, IssueState, RepositoryDetails, RepositorySummary, TreeFile, UserProfile};
use crate::search::{RepositorySearch, SearchQuery};

/// Thin typed client over the GitHub REST and GraphQL APIs.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, config: GitHubConfig) -> Self {
        Self { http, config }
    }

    /// A client using `token` instead of the configured one (e.g. for a
    /// private repository). Blank tokens keep the configured token.
    pub fn with_token(&self, token: Option<&str>) -> Self {
        let mut client = self.clone();
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            client.config.token = Some(token.to_string());
        }
        client
    }

    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .with_context(|| format!("Invalid GitHub API URL: {}", self.config.api_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("GitHub API URL cannot be a base: {}", self.config.api_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, &self.config.user_agent)
            .header("X-GitHub-Api-Version", "2022-11-28");
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// GET and decode. A 404 becomes `FailureKind::NotFound(what)` so callers
    /// can tell a missing resource from an outage.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let url = self.url(segments)?;
        tracing::debug!("GitHub GET {url}");
        let resp = self
            .authorize(self.http.get(url))
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to call GitHub API for {what}"))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FailureKind::NotFound(what.to_string()).into());
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned {status} for {what}: {body}");
        }

        resp.json()
            .await
            .with_context(|| format!("Failed to parse GitHub response for {what}"))
    }

    pub async fn get_repo(&self, repo: &RepoRef) -> Result<RepositoryDetails> {
        let api: ApiRepo = self
            .get_json(&["repos", &repo.owner, &repo.name], &[], &format!("repository {repo}"))
            .await?;
        Ok(api.into())
    }

    /// All blobs of `branch`, recursively.
    pub async fn get_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeFile>> {
        let tree: TreeResponse = self
            .get_json(
                &["repos", &repo.owner, &repo.name, "git", "trees", branch],
                &[("recursive", "1".to_string())],
                &format!("tree {branch} of {repo}"),
            )
            .await?;
        if tree.truncated {
            tracing::warn!("Tree of {repo} was truncated by GitHub; some files are missing");
        }
        Ok(tree.tree.into_iter().filter_map(TreeEntry::into_blob).collect())
    }

    /// Text of a file, or `None` for directories, submodules and empty files.
    pub async fn get_file_content(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str(), "contents"];
        segments.extend(path.split('/'));
        let content: ContentResponse = self
            .get_json(&segments, &[], &format!("{path} in {repo}"))
            .await?;
        if content.kind != "file" {
            return Ok(None);
        }
        let text = self.decode_content(content).await?;
        Ok(Some(text).filter(|t| !t.is_empty()))
    }

    pub async fn get_readme(&self, repo: &RepoRef) -> Result<String> {
        let content: ContentResponse = self
            .get_json(&["repos", &repo.owner, &repo.name, "readme"], &[], &format!("README of {repo}"))
            .await?;
        self.decode_content(content).await
    }

    /// Inline base64 first; the raw download URL when inline content is
    /// missing or not UTF-8.
    async fn decode_content(&self, content: ContentResponse) -> Result<String> {
        if let (Some(encoded), Some("base64")) = (&content.content, content.encoding.as_deref()) {
            if let Some(text) = decode_base64_text(encoded) {
                return Ok(text);
            }
        }
        let Some(download_url) = content.download_url else {
            anyhow::bail!("GitHub returned no readable content");
        };
        let resp = self
            .authorize(self.http.get(&download_url))
            .send()
            .await
            .context("Failed to download raw file content")?;
        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("Raw content download returned {status}");
        }
        resp.text().await.context("Failed to read raw file content")
    }

    pub async fn get_user(&self, username: &str) -> Result<UserProfile> {
        self.get_json(&["users", username], &[], &format!("user {username}"))
            .await
    }

    /// Up to 100 public repositories owned by `username`.
    pub(crate) async fn list_user_repos(&self, username: &str) -> Result<Vec<ApiUserRepo>> {
        self.get_json(
            &["users", username, "repos"],
            &[("per_page", "100".to_string()), ("type", "owner".to_string())],
            &format!("repositories of {username}"),
        )
        .await
    }

    /// Last year's contribution calendar. GraphQL requires a token.
    pub(crate) async fn contribution_calendar(&self, username: &str) -> Result<ContributionCalendar> {
        if self.config.token.is_none() {
            anyhow::bail!("GitHub GraphQL API requires a token");
        }
        let url = self.url(&["graphql"])?;
        let req = GraphQlRequest {
            query: CONTRIBUTIONS_QUERY,
            variables: LoginVariables { login: username },
        };
        let resp = self
            .authorize(self.http.post(url))
            .json(&req)
            .send()
            .await
            .context("Failed to call GitHub GraphQL API")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub GraphQL API returned {status}: {body}");
        }

        let body: GraphQlResponse = resp
            .json()
            .await
            .context("Failed to parse GitHub GraphQL response")?;
        if let Some(err) = body.errors.first() {
            anyhow::bail!("GitHub GraphQL error: {}", err.message);
        }
        body.data
            .and_then(|d| d.user)
            .map(|u| u.contributions_collection.contribution_calendar)
            .with_context(|| format!("No contribution data for {username}"))
    }

    pub async fn list_issues(
        &self,
        repo: &RepoRef,
        state: IssueState,
        labels: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Issue>> {
        let mut query = vec![
            ("state", state.as_str().to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(labels) = labels.map(str::trim).filter(|l| !l.is_empty()) {
            query.push(("labels", labels.to_string()));
        }
        let issues: Vec<ApiIssue> = self
            .get_json(
                &["repos", &repo.owner, &repo.name, "issues"],
                &query,
                &format!("issues of {repo}"),
            )
            .await?;
        Ok(issues.into_iter().map(Issue::from).collect())
    }
}

fn decode_base64_text(encoded: &str) -> Option<String> {
    // GitHub wraps base64 at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact).ok()?;
    String::from_utf8(bytes).ok()
}

/// The `q` parameter of the search API: keywords plus a language qualifier.
pub(crate) fn search_qualifier(query: &SearchQuery) -> String {
    let mut q = query.keywords.join(" ");
    if let Some(language) = &query.language {
        q.push_str(" language:");
        q.push_str(language);
    }
    q
}

#[async_trait]
impl RepositorySearch for GitHubClient {
    async fn search_repositories(&self, query: &SearchQuery) -> Result<Vec<RepositorySummary>> {
        let resp: SearchReposResponse = self
            .get_json(
                &["search", "repositories"],
                &[
                    ("q", search_qualifier(query)),
                    ("sort", "stars".to_string()),
                    ("order", "desc".to_string()),
                    ("per_page", query.per_page.to_string()),
                    ("page", query.page.to_string()),
                ],
                "repository search",
            )
            .await?;
        Ok(resp.items.into_iter().map(RepositorySummary::from).collect())
    }
}

#[async_trait]
impl RepositoryFiles for GitHubClient {
    async fn repository(&self, repo: &RepoRef) -> Result<RepositoryDetails> {
        self.get_repo(repo).await
    }

    async fn file_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeFile>> {
        self.get_tree(repo, branch).await
    }

    async fn file_content(&self, repo: &RepoRef, path: &str) -> Result<Option<String>> {
        self.get_file_content(repo, path).await
    }
}
