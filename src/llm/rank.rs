use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm::client::LlmClient;
use crate::llm::extract;
use crate::models::{Ranking, RepositorySummary};
use crate::search::RelevanceRanker;

#[async_trait]
impl RelevanceRanker for LlmClient {
    async fn rank(&self, repos: &[RepositorySummary], query: &str) -> Result<Vec<Ranking>> {
        if repos.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = build_ranking_prompt(repos, query)?;
        let response = self.complete(&prompt).await?;
        parse_rankings(&response)
    }
}

#[derive(Serialize)]
struct RankingCandidate<'a> {
    id: u64,
    name: &'a str,
    description: Option<&'a str>,
    language: Option<&'a str>,
    topics: &'a [String],
}

fn build_ranking_prompt(repos: &[RepositorySummary], query: &str) -> Result<String> {
    let candidates: Vec<RankingCandidate<'_>> = repos
        .iter()
        .map(|r| RankingCandidate {
            id: r.id,
            name: &r.full_name,
            description: r.description.as_deref(),
            language: r.language.as_deref(),
            topics: &r.topics,
        })
        .collect();
    let listing = serde_json::to_string_pretty(&candidates)?;

    Ok(format!(
        "You are a senior software engineer evaluating open-source projects. Rank the \
         following GitHub repositories for relevance to the user's query.\n\n\
         User Query: \"{query}\"\n\n\
         For each repository give a relevance score from 0.0 to 1.0 (1.0 is a perfect match) \
         and a one-sentence reasoning. Consider the description, topics and language.\n\n\
         Respond with ONLY a JSON array:\n\
         [{{\"id\": <repository_id>, \"relevance_score\": <0.0-1.0>, \"relevance_reasoning\": \"<sentence>\"}}]\n\n\
         Repositories:\n{listing}"
    ))
}

#[derive(Deserialize)]
struct RawRanking {
    id: u64,
    relevance_score: f32,
    #[serde(default)]
    relevance_reasoning: Option<String>,
}

/// Parse the model's JSON array. Scores are clamped into [0, 1]; non-finite
/// scores are dropped. A response with no array at all is an error so the
/// caller can fall back.
fn parse_rankings(content: &str) -> Result<Vec<Ranking>> {
    let json = extract::json_array(content).context("No JSON array in ranking response")?;
    let raw: Vec<RawRanking> =
        serde_json::from_str(json).context("Failed to parse ranking response")?;

    Ok(raw
        .into_iter()
        .filter(|r| r.relevance_score.is_finite())
        .map(|r| Ranking {
            id: r.id,
            relevance_score: r.relevance_score.clamp(0.0, 1.0),
            relevance_reasoning: r.relevance_reasoning.filter(|s| !s.trim().is_empty()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_array() {
        let input = r#"[{"id": 1, "relevance_score": 0.9, "relevance_reasoning": "Exact match."},
                        {"id": 3, "relevance_score": 0.4, "relevance_reasoning": "Partial."}]"#;
        let rankings = parse_rankings(input).unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].id, 1);
        assert_eq!(rankings[0].relevance_reasoning.as_deref(), Some("Exact match."));
    }

    #[test]
    fn test_parse_array_in_markdown() {
        let input = "```json\n[{\"id\": 42, \"relevance_score\": 0.5}]\n```";
        let rankings = parse_rankings(input).unwrap();
        assert_eq!(rankings[0].id, 42);
        assert_eq!(rankings[0].relevance_reasoning, None);
    }

    #[test]
    fn test_scores_clamped() {
        let input = r#"[{"id": 1, "relevance_score": 7.5}, {"id": 2, "relevance_score": -1}]"#;
        let rankings = parse_rankings(input).unwrap();
        assert_eq!(rankings[0].relevance_score, 1.0);
        assert_eq!(rankings[1].relevance_score, 0.0);
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_rankings("I cannot rank these.").is_err());
        assert!(parse_rankings("[not json]").is_err());
    }

    #[test]
    fn test_prompt_lists_every_repository() {
        let repos = vec![RepositorySummary {
            id: 99,
            full_name: "tokio-rs/axum".to_string(),
            description: Some("Web framework".to_string()),
            language: Some("Rust".to_string()),
            topics: vec!["http".to_string()],
            stars: 20000,
            html_url: None,
            relevance_score: None,
            relevance_reasoning: None,
        }];
        let prompt = build_ranking_prompt(&repos, "rust web server").unwrap();
        assert!(prompt.contains("\"rust web server\""));
        assert!(prompt.contains("tokio-rs/axum"));
        assert!(prompt.contains("99"));
    }
}
