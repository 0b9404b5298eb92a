//! Integration tests for the what-to-build pipelines.
//!
//! GitHub and the LLM are replaced by in-memory collaborators so the
//! search, comparison, analysis, README and diagram flows run end to end
//! without network access.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use what_to_build::analyze::{analyze_repository, FileSummarizer, RepositoryFiles, SourceFile};
use what_to_build::compare::{compare, fallback_roast, Badge, NarrativeGenerator, ProfileSource};
use what_to_build::error::FailureKind;
use what_to_build::github::RepoRef;
use what_to_build::llm::diagram::generate_architecture_diagram;
use what_to_build::llm::TextCompletion;
use what_to_build::models::{
    FileSummary, Ranking, RepositoryDetails, RepositorySummary, TreeFile, UserProfile, UserSnapshot,
    UserStats,
};
use what_to_build::readme::generate_readme;
use what_to_build::search::{
    fetch_and_rank, RankedResults, RelevanceRanker, RepositorySearch, SearchQuery, SearchRequest,
};

// ─── Search collaborators ────────────────────────────────

fn repo(id: u64, stars: u64) -> RepositorySummary {
    RepositorySummary {
        id,
        full_name: format!("acme/project-{id}"),
        description: Some(format!("Project number {id}")),
        language: Some("TypeScript".to_string()),
        topics: vec!["react".to_string()],
        stars,
        html_url: Some(format!("https://github.com/acme/project-{id}")),
        relevance_score: None,
        relevance_reasoning: None,
    }
}

/// Serves fixed pages keyed by page number.
struct PagedSearch {
    pages: HashMap<u32, Vec<RepositorySummary>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl PagedSearch {
    fn new(pages: Vec<(u32, Vec<RepositorySummary>)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RepositorySearch for PagedSearch {
    async fn search_repositories(&self, query: &SearchQuery) -> anyhow::Result<Vec<RepositorySummary>> {
        self.queries.lock().push(query.clone());
        Ok(self.pages.get(&query.page).cloned().unwrap_or_default())
    }
}

struct ScriptedRanker {
    scores: Vec<(u64, f32)>,
}

#[async_trait]
impl RelevanceRanker for ScriptedRanker {
    async fn rank(&self, repos: &[RepositorySummary], _query: &str) -> anyhow::Result<Vec<Ranking>> {
        Ok(self
            .scores
            .iter()
            .filter(|(id, _)| repos.iter().any(|r| r.id == *id))
            .map(|&(id, score)| Ranking {
                id,
                relevance_score: score,
                relevance_reasoning: Some(format!("matches query ({score})")),
            })
            .collect())
    }
}

struct BrokenRanker;

#[async_trait]
impl RelevanceRanker for BrokenRanker {
    async fn rank(&self, _repos: &[RepositorySummary], _query: &str) -> anyhow::Result<Vec<Ranking>> {
        anyhow::bail!("Gemini API returned 503 Service Unavailable: overloaded")
    }
}

fn request(query: &str, page: u32) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        language: None,
        page,
        per_page: 10,
    }
}

fn ids(items: &[RepositorySummary]) -> Vec<u64> {
    items.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn test_search_ranks_partial_scores_first() {
    let search = PagedSearch::new(vec![(1, (1..=10).map(|id| repo(id, 100 - id)).collect())]);
    let ranker = ScriptedRanker {
        scores: vec![(1, 0.9), (3, 0.7), (5, 0.5)],
    };
    let mut results = RankedResults::default();

    let outcome = fetch_and_rank(&search, &ranker, &mut results, &request("chat app react", 1))
        .await
        .unwrap();

    assert!(!outcome.is_degraded());
    let page = outcome.into_value();
    assert_eq!(ids(&page.items), vec![1, 3, 5, 2, 4, 6, 7, 8, 9, 10]);
    assert!(page.has_more);
    assert_eq!(page.items[0].relevance_score, Some(0.9));
    assert_eq!(page.items[3].relevance_score, None);

    let queries = search.queries.lock();
    assert_eq!(queries[0].keywords, vec!["chat", "app", "react"]);
    assert_eq!(queries[0].per_page, 10);
}

#[tokio::test]
async fn test_search_falls_back_to_star_order() {
    let batch = vec![repo(1, 5), repo(2, 50), repo(3, 20), repo(4, 50)];
    let search = PagedSearch::new(vec![(1, batch)]);
    let mut results = RankedResults::default();

    let outcome = fetch_and_rank(&search, &BrokenRanker, &mut results, &request("cli tool", 1))
        .await
        .unwrap();

    assert!(outcome.is_degraded());
    assert!(matches!(
        outcome.cause(),
        Some(FailureKind::Upstream { service: "relevance ranking", .. })
    ));
    let page = outcome.into_value();
    // Equal star counts keep their search order
    assert_eq!(ids(&page.items), vec![2, 4, 3, 1]);
    assert!(!page.has_more);
    assert_eq!(results.len(), 4);
}

#[tokio::test]
async fn test_load_more_accumulates_and_reranks() {
    let search = PagedSearch::new(vec![
        (1, (1..=10).map(|id| repo(id, 1_000 - id)).collect()),
        (2, (11..=20).map(|id| repo(id, 1_000 - id)).collect()),
        (3, Vec::new()),
    ]);
    let ranker = ScriptedRanker {
        scores: vec![(1, 0.9), (3, 0.7), (15, 0.95)],
    };
    let mut results = RankedResults::default();

    fetch_and_rank(&search, &ranker, &mut results, &request("rust web", 1))
        .await
        .unwrap();
    let second = fetch_and_rank(&search, &ranker, &mut results, &request("rust web", 2))
        .await
        .unwrap()
        .into_value();

    assert_eq!(second.items.len(), 20);
    assert_eq!(ids(&second.items)[..4].to_vec(), vec![15, 1, 3, 2]);
    assert_eq!(results.get(1).unwrap().relevance_score, Some(0.9));

    let last = fetch_and_rank(&search, &ranker, &mut results, &request("rust web", 3))
        .await
        .unwrap()
        .into_value();
    assert!(last.items.is_empty());
    assert!(!last.has_more);
    assert_eq!(results.len(), 20);
}

#[tokio::test]
async fn test_repeated_page_merges_idempotently() {
    let search = PagedSearch::new(vec![(1, (1..=4).map(|id| repo(id, id)).collect())]);
    let ranker = ScriptedRanker {
        scores: vec![(2, 0.8), (4, 0.6)],
    };
    let mut results = RankedResults::default();

    let first = fetch_and_rank(&search, &ranker, &mut results, &request("game engine", 1))
        .await
        .unwrap()
        .into_value();
    let again = fetch_and_rank(&search, &ranker, &mut results, &request("game engine", 1))
        .await
        .unwrap()
        .into_value();

    assert_eq!(first.items, again.items);
    assert_eq!(results.len(), 4);
}

// ─── Comparison collaborators ────────────────────────────

fn snapshot(login: &str, stars: u64, followers: u64, repos: u64) -> UserSnapshot {
    UserSnapshot {
        profile: UserProfile {
            login: login.to_string(),
            name: Some(login.to_uppercase()),
            avatar_url: None,
            bio: None,
            public_repos: repos,
            followers,
            following: 1,
            created_at: Utc::now(),
        },
        stats: UserStats {
            total_stars: stars,
            ..UserStats::default()
        },
    }
}

struct KnownUsers(Vec<UserSnapshot>);

#[async_trait]
impl ProfileSource for KnownUsers {
    async fn fetch_snapshot(&self, username: &str) -> anyhow::Result<UserSnapshot> {
        self.0
            .iter()
            .find(|s| s.profile.login.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or_else(|| FailureKind::NotFound(format!("user {username}")).into())
    }
}

struct Narrator(anyhow::Result<&'static str>);

#[async_trait]
impl NarrativeGenerator for Narrator {
    async fn roast(&self, _user1: &UserSnapshot, _user2: &UserSnapshot) -> anyhow::Result<String> {
        match &self.0 {
            Ok(text) => Ok(text.to_string()),
            Err(e) => anyhow::bail!("{e}"),
        }
    }
}

fn known_users() -> KnownUsers {
    KnownUsers(vec![snapshot("octocat", 2_000, 10, 8), snapshot("newbie", 3, 2, 4)])
}

#[tokio::test]
async fn test_compare_with_narrative() {
    let outcome = compare(&known_users(), &Narrator(Ok("🔥 roasted")), "octocat", "newbie")
        .await
        .unwrap();

    assert!(!outcome.is_degraded());
    let comparison = outcome.into_value();
    assert_eq!(comparison.winner, "octocat");
    assert_eq!(comparison.user1.badge, Badge::StarHunter);
    assert_eq!(comparison.user2.badge, Badge::RisingStar);
    assert_eq!(comparison.roast, "🔥 roasted");
}

#[tokio::test]
async fn test_compare_falls_back_when_narrative_fails() {
    let narrator = Narrator(Err(anyhow::anyhow!("quota exceeded")));
    let outcome = compare(&known_users(), &narrator, "octocat", "newbie")
        .await
        .unwrap();

    assert!(matches!(
        outcome.cause(),
        Some(FailureKind::Upstream { service: "narrative generation", .. })
    ));
    let comparison = outcome.into_value();
    assert_eq!(comparison.roast, fallback_roast("octocat", "newbie"));
    assert_eq!(comparison.winner, "octocat");
}

#[tokio::test]
async fn test_compare_blank_narrative_is_degraded() {
    let outcome = compare(&known_users(), &Narrator(Ok("   ")), "octocat", "newbie")
        .await
        .unwrap();
    assert_eq!(
        outcome.cause(),
        Some(&FailureKind::EmptyResponse("narrative generation"))
    );
}

#[tokio::test]
async fn test_compare_unknown_user_is_not_found() {
    let err = compare(&known_users(), &Narrator(Ok("unused")), "octocat", "ghost")
        .await
        .unwrap_err();
    assert_eq!(err, FailureKind::NotFound("user ghost".to_string()));
}

#[tokio::test]
async fn test_compare_requires_both_usernames() {
    let err = compare(&known_users(), &Narrator(Ok("unused")), "octocat", "  ")
        .await
        .unwrap_err();
    assert_eq!(err, FailureKind::MissingInput("username"));
}

// ─── Repository collaborators ────────────────────────────

/// In-memory repository; paths mapped to `None` fail to fetch.
struct FakeRepo {
    files: Vec<(&'static str, Option<&'static str>)>,
}

#[async_trait]
impl RepositoryFiles for FakeRepo {
    async fn repository(&self, repo: &RepoRef) -> anyhow::Result<RepositoryDetails> {
        Ok(RepositoryDetails {
            full_name: repo.full_name(),
            description: Some("A demo".to_string()),
            language: Some("Rust".to_string()),
            stars: 12,
            default_branch: "trunk".to_string(),
        })
    }

    async fn file_tree(&self, _repo: &RepoRef, branch: &str) -> anyhow::Result<Vec<TreeFile>> {
        assert_eq!(branch, "trunk");
        Ok(self
            .files
            .iter()
            .map(|(path, content)| TreeFile {
                path: path.to_string(),
                size: content.map(|c| c.len() as u64),
            })
            .collect())
    }

    async fn file_content(&self, _repo: &RepoRef, path: &str) -> anyhow::Result<Option<String>> {
        match self.files.iter().find(|(p, _)| *p == path) {
            Some((_, Some(content))) => Ok(Some(content.to_string())),
            _ => anyhow::bail!("GitHub API returned 500 for {path}"),
        }
    }
}

struct EchoSummarizer {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl FileSummarizer for EchoSummarizer {
    async fn summarize(&self, files: &[SourceFile]) -> anyhow::Result<Vec<FileSummary>> {
        self.seen.lock().extend(files.iter().map(|f| f.path.clone()));
        Ok(files
            .iter()
            .map(|f| FileSummary {
                path: f.path.clone(),
                summary: format!("{} bytes of code", f.content.len()),
            })
            .collect())
    }
}

fn demo_repo() -> RepoRef {
    RepoRef::parse("acme/demo").unwrap()
}

#[tokio::test]
async fn test_analyze_skips_unfetchable_files() {
    let repo = FakeRepo {
        files: vec![
            ("src/main.rs", Some("fn main() {}")),
            ("src/broken.rs", None),
            ("logo.svg", Some("<svg/>")),
            ("Dockerfile", Some("FROM rust")),
        ],
    };
    let summarizer = EchoSummarizer {
        seen: Mutex::new(Vec::new()),
    };

    let response = analyze_repository(&repo, &summarizer, &demo_repo(), 25)
        .await
        .unwrap();

    assert_eq!(*summarizer.seen.lock(), vec!["src/main.rs", "Dockerfile"]);
    assert_eq!(response.summaries.len(), 2);
    assert!(response.message.is_none());
}

#[tokio::test]
async fn test_analyze_without_source_files_explains() {
    let repo = FakeRepo {
        files: vec![("logo.png", Some("png"))],
    };
    let summarizer = EchoSummarizer {
        seen: Mutex::new(Vec::new()),
    };
    let response = analyze_repository(&repo, &summarizer, &demo_repo(), 25)
        .await
        .unwrap();
    assert!(response.summaries.is_empty());
    assert!(response.message.is_some());
    assert!(summarizer.seen.lock().is_empty());
}

#[tokio::test]
async fn test_analyze_fails_when_nothing_fetches() {
    let repo = FakeRepo {
        files: vec![("src/a.rs", None), ("src/b.rs", None)],
    };
    let summarizer = EchoSummarizer {
        seen: Mutex::new(Vec::new()),
    };
    let err = analyze_repository(&repo, &summarizer, &demo_repo(), 25)
        .await
        .unwrap_err();
    assert!(matches!(err, FailureKind::Upstream { service: "github", .. }));
}

/// Replies with canned text and records the prompt.
struct CannedCompletion {
    reply: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl CannedCompletion {
    fn new(reply: &'static str) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextCompletion for CannedCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.reply.to_string())
    }
}

#[tokio::test]
async fn test_readme_prompt_uses_fetched_files_and_notes() {
    let repo = FakeRepo {
        files: vec![
            ("src/lib.rs", Some("pub fn launch() {}")),
            ("README.md", Some("# Demo")),
            ("docs/broken.md", None),
        ],
    };
    let llm = CannedCompletion::new("# Demo\n\nA generated README.");

    let markdown = generate_readme(&repo, &llm, &demo_repo(), Some("Mention the launch API"))
        .await
        .unwrap();

    assert!(markdown.starts_with("# Demo"));
    let prompts = llm.prompts.lock();
    let prompt = &prompts[0];
    assert!(prompt.contains("Repository: acme/demo"));
    assert!(prompt.contains("Path: README.md"));
    assert!(prompt.contains("pub fn launch() {}"));
    assert!(!prompt.contains("Path: docs/broken.md"));
    assert!(prompt.contains("Mention the launch API"));
}

#[tokio::test]
async fn test_readme_empty_reply_is_an_error() {
    let repo = FakeRepo {
        files: vec![("README.md", Some("# Demo"))],
    };
    let err = generate_readme(&repo, &CannedCompletion::new("  \n"), &demo_repo(), None)
        .await
        .unwrap_err();
    assert_eq!(err, FailureKind::EmptyResponse("README generation"));
}

#[tokio::test]
async fn test_generated_diagram_is_normalized_and_parsed() {
    let llm = CannedCompletion::new(
        "Here you go:\n```json\n{\"diagram\": \"graph TD\\n    A[Web UI (React)] --> B[API]\\n    B --> C[Postgres]\\n    ---\\n\"}\n```",
    );

    let diagram = generate_architecture_diagram(&llm, "# Demo\nA web app.", "acme/demo")
        .await
        .unwrap();

    assert!(diagram.text.starts_with("graph TD"));
    assert!(!diagram.text.contains("(React)"));
    assert_eq!(diagram.graph.node("A").unwrap().label, "Web UI ");
    assert_eq!(diagram.graph.edges.len(), 2);
    assert!(llm.prompts.lock()[0].contains("acme/demo"));
}
