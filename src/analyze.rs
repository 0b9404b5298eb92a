//! Repository file analysis: pick the source files of a repository and ask
//! for a one-sentence summary of each.

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;

use crate::error::FailureKind;
use crate::github::RepoRef;
use crate::models::{AnalyzeResponse, FileSummary, RepositoryDetails, TreeFile};

/// Read access to a hosted repository (GitHub).
#[async_trait]
pub trait RepositoryFiles: Send + Sync {
    async fn repository(&self, repo: &RepoRef) -> Result<RepositoryDetails>;

    /// All blobs on `branch`.
    async fn file_tree(&self, repo: &RepoRef, branch: &str) -> Result<Vec<TreeFile>>;

    /// `None` for empty or non-file entries.
    async fn file_content(&self, repo: &RepoRef, path: &str) -> Result<Option<String>>;
}

/// A file with its fetched text.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// Writes one-sentence summaries for a batch of files (an LLM).
#[async_trait]
pub trait FileSummarizer: Send + Sync {
    async fn summarize(&self, files: &[SourceFile]) -> Result<Vec<FileSummary>>;
}

const ANALYZED_EXTENSIONS: &[&str] = &[
    ".js", ".jsx", ".ts", ".tsx", ".py", ".go", ".java", ".cs", ".rb", ".php", ".rs", ".c", ".cpp",
    ".h", ".hpp", ".swift", ".kt", ".kts", ".yml", ".yaml", ".json", ".md",
];

const ANALYZED_NAMES: &[&str] = &["Dockerfile", "Makefile"];

pub const NO_RELEVANT_FILES: &str = "No relevant source code files were found to analyze.";

pub fn is_analyzed(file: &TreeFile) -> bool {
    ANALYZED_NAMES.contains(&file.file_name())
        || ANALYZED_EXTENSIONS.iter().any(|ext| file.path.ends_with(ext))
}

/// The first `max_files` analyzable files, in tree order.
pub fn select_files(tree: Vec<TreeFile>, max_files: usize) -> Vec<TreeFile> {
    tree.into_iter().filter(is_analyzed).take(max_files).collect()
}

/// Summarize the source files on the default branch of `repo`.
pub async fn analyze_repository(
    files: &dyn RepositoryFiles,
    summarizer: &dyn FileSummarizer,
    repo: &RepoRef,
    max_files: usize,
) -> Result<AnalyzeResponse, FailureKind> {
    let details = files
        .repository(repo)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;
    let tree = files
        .file_tree(repo, &details.default_branch)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;

    let selected = select_files(tree, max_files);
    if selected.is_empty() {
        tracing::info!("No analyzable files in {repo}");
        return Ok(AnalyzeResponse {
            summaries: Vec::new(),
            message: Some(NO_RELEVANT_FILES.to_string()),
        });
    }

    let fetched = join_all(selected.iter().map(|file| async move {
        match files.file_content(repo, &file.path).await {
            Ok(Some(content)) => Some(SourceFile {
                path: file.path.clone(),
                content,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Could not fetch {} from {repo}, skipping: {e:#}", file.path);
                None
            }
        }
    }))
    .await;
    let sources: Vec<SourceFile> = fetched.into_iter().flatten().collect();

    if sources.is_empty() {
        return Err(FailureKind::Upstream {
            service: "github",
            message: format!("could not fetch content for any of the {} relevant files", selected.len()),
        });
    }

    tracing::info!("Summarizing {} of {} files from {repo}", sources.len(), selected.len());
    let summaries = summarizer
        .summarize(&sources)
        .await
        .map_err(|e| FailureKind::upstream("file summarization", e))?;

    Ok(AnalyzeResponse {
        summaries,
        message: None,
    })
}
