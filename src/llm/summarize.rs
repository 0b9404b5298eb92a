use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::analyze::{FileSummarizer, SourceFile};
use crate::llm::client::LlmClient;
use crate::llm::extract;
use crate::models::FileSummary;

/// Characters of each file sent to the model.
const MAX_FILE_CHARS: usize = 2_000;

#[async_trait]
impl FileSummarizer for LlmClient {
    async fn summarize(&self, files: &[SourceFile]) -> Result<Vec<FileSummary>> {
        let prompt = build_summary_prompt(files)?;
        let response = self.complete(&prompt).await?;
        parse_summaries(&response)
    }
}

#[derive(Serialize)]
struct FileExcerpt<'a> {
    path: &'a str,
    content: &'a str,
}

fn build_summary_prompt(files: &[SourceFile]) -> Result<String> {
    let excerpts: Vec<FileExcerpt<'_>> = files
        .iter()
        .map(|f| FileExcerpt {
            path: &f.path,
            content: extract::truncate_chars(&f.content, MAX_FILE_CHARS),
        })
        .collect();
    let listing = serde_json::to_string_pretty(&excerpts)?;

    Ok(format!(
        "You are an expert code analyst. For each file below, write a concise one-sentence \
         summary of its primary purpose and its role in the project.\n\n\
         Respond with ONLY a JSON array:\n\
         [{{\"path\": \"<file_path>\", \"summary\": \"<one_sentence_summary>\"}}]\n\n\
         Files:\n{listing}"
    ))
}

fn parse_summaries(content: &str) -> Result<Vec<FileSummary>> {
    let stripped = extract::strip_code_fences(content);
    let json = extract::json_array(stripped).unwrap_or(stripped);
    serde_json::from_str(json).context("Failed to parse file summaries")
}
