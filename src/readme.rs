//! README generation from a sample of a repository's files.
//!
//! Candidate files are scored so that documentation, manifests and root
//! files come first, then trimmed to a file count and byte budget that keeps
//! the prompt manageable.

use std::fmt::Write;

use crate::analyze::RepositoryFiles;
use crate::error::FailureKind;
use crate::github::RepoRef;
use crate::llm::{extract, TextCompletion};
use crate::models::{RepositoryDetails, TreeFile};

const MAX_FILES: usize = 40;
const MAX_TOTAL_BYTES: u64 = 600_000;
const MAX_FILE_BYTES: u64 = 150_000;
const EXCERPT_CHARS: usize = 4_000;

const INTERESTING_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".py", ".rs", ".go", ".rb", ".java", ".cs", ".php", ".kt",
    ".swift", ".md", ".json", ".yml", ".yaml",
];

const IMPORTANT_NAMES: &[&str] = &[
    "README.md",
    "readme.md",
    "package.json",
    "requirements.txt",
    "pyproject.toml",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "composer.json",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    "pnpm-lock.yaml",
    "yarn.lock",
];

fn is_interesting(file: &TreeFile) -> bool {
    IMPORTANT_NAMES.contains(&file.file_name())
        || INTERESTING_EXTENSIONS.iter().any(|ext| file.path.ends_with(ext))
}

/// Higher is more useful for describing the project.
pub fn candidate_score(path: &str) -> u32 {
    let p = path.to_lowercase();
    let mut score = 0;
    if p == "readme.md" {
        score += 100;
    }
    if p.contains("readme") {
        score += 20;
    }
    if p.starts_with("docs/") {
        score += 30;
    }
    if !p.contains('/') {
        score += 25;
    }
    if p.ends_with(".md") {
        score += 15;
    }
    if p.ends_with("package.json") {
        score += 40;
    }
    if p.ends_with("dockerfile") {
        score += 20;
    }
    if [".ts", ".tsx", ".js", ".jsx"].iter().any(|ext| p.ends_with(ext)) {
        score += 5;
    }
    score
}

/// Best-scored interesting files within the file and byte budgets. Equal
/// scores keep tree order.
pub fn select_candidates(tree: Vec<TreeFile>) -> Vec<TreeFile> {
    let mut scored: Vec<(u32, TreeFile)> = tree
        .into_iter()
        .filter(is_interesting)
        .map(|f| (candidate_score(&f.path), f))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut selected = Vec::new();
    let mut total = 0;
    for (_, file) in scored {
        if selected.len() >= MAX_FILES {
            break;
        }
        let size = file.size.unwrap_or(0);
        if size > MAX_FILE_BYTES || total + size > MAX_TOTAL_BYTES {
            continue;
        }
        total += size;
        selected.push(file);
    }
    selected
}

pub fn build_readme_prompt(
    details: &RepositoryDetails,
    files: &[(String, String)],
    user_notes: Option<&str>,
) -> String {
    let mut prompt = String::from(
        "You are an expert open-source maintainer. Generate a comprehensive, professional \
         README.md for the repository below.\n\n\
         Requirements:\n\
         - Clear title and short description\n\
         - Badges (e.g., build, license, npm/pypi if applicable)\n\
         - Table of Contents\n\
         - Features\n\
         - Architecture overview\n\
         - Tech stack\n\
         - Getting Started (installation, prerequisites)\n\
         - Configuration (env variables)\n\
         - Usage with code examples\n\
         - Project structure\n\
         - Roadmap or TODO\n\
         - Contributing\n\
         - Testing\n\
         - License\n\
         - Acknowledgements\n\n\
         Write in Markdown, use headings and code fences. Prefer concise, actionable content. \
         Derive details from the provided files and metadata. If something is unknown, suggest \
         sensible defaults and placeholders.\n\n",
    );

    let _ = writeln!(prompt, "Repository: {}", details.full_name);
    let _ = writeln!(prompt, "Description: {}", details.description.as_deref().unwrap_or(""));
    let _ = writeln!(prompt, "Stars: {}", details.stars);
    let _ = writeln!(prompt, "Language: {}", details.language.as_deref().unwrap_or("N/A"));
    prompt.push_str("\nProject files (samples):\n");

    let excerpts: Vec<String> = files
        .iter()
        .map(|(path, content)| {
            format!("---\nPath: {path}\n\n{}", extract::truncate_chars(content, EXCERPT_CHARS))
        })
        .collect();
    prompt.push_str(&excerpts.join("\n\n"));

    if let Some(notes) = user_notes.map(str::trim).filter(|n| !n.is_empty()) {
        let _ = write!(prompt, "\n\nAdditional author notes/preferences:\n{notes}");
    }
    prompt
}

/// Draft a README for `repo` from its metadata and a sample of its files.
pub async fn generate_readme(
    files: &dyn RepositoryFiles,
    llm: &dyn TextCompletion,
    repo: &RepoRef,
    user_notes: Option<&str>,
) -> Result<String, FailureKind> {
    let details = files
        .repository(repo)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;
    let tree = files
        .file_tree(repo, &details.default_branch)
        .await
        .map_err(|e| FailureKind::upstream("github", e))?;

    let candidates = select_candidates(tree);
    let mut samples = Vec::with_capacity(candidates.len());
    for file in &candidates {
        match files.file_content(repo, &file.path).await {
            Ok(Some(content)) => samples.push((file.path.clone(), content)),
            Ok(None) => {}
            Err(e) => tracing::debug!("Skipping unreadable {}: {e:#}", file.path),
        }
    }
    tracing::info!(
        "Generating README for {repo} from {} of {} candidate files",
        samples.len(),
        candidates.len()
    );

    let prompt = build_readme_prompt(&details, &samples, user_notes);
    let markdown = llm
        .complete(&prompt)
        .await
        .map_err(|e| FailureKind::upstream("README generation", e))?;
    if markdown.trim().is_empty() {
        return Err(FailureKind::EmptyResponse("README generation"));
    }
    Ok(markdown)
}
