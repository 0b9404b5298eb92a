use anyhow::{Context, Result};
use serde::Deserialize;

use crate::diagram::{self, DiagramGraph};
use crate::llm::client::TextCompletion;
use crate::llm::extract;

const MAX_README_CHARS: usize = 30_000;

/// An architecture diagram ready for rendering.
#[derive(Debug, Clone)]
pub struct GeneratedDiagram {
    /// Normalized diagram text
    pub text: String,
    pub graph: DiagramGraph,
}

/// Ask the model for a flowchart of the repository described by `readme`,
/// then normalize and parse it.
pub async fn generate_architecture_diagram(
    llm: &dyn TextCompletion,
    readme: &str,
    repo_full_name: &str,
) -> Result<GeneratedDiagram> {
    let prompt = build_diagram_prompt(readme, repo_full_name);
    let response = llm.complete(&prompt).await?;
    let raw = extract_diagram(&response)?;

    let text = diagram::normalize(&raw);
    let graph = diagram::parse(&text);
    tracing::info!(
        "Diagram for {repo_full_name}: {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(GeneratedDiagram { text, graph })
}

fn build_diagram_prompt(readme: &str, repo_full_name: &str) -> String {
    let readme = extract::truncate_chars(readme, MAX_README_CHARS);
    format!(
        "You are an expert software architect. Analyze the README of the repository \
         {repo_full_name} and produce an architecture diagram showing the main application \
         structure, key components and their relationships, data flow, external integrations \
         and the technology stack.\n\n\
         Return ONLY JSON of the form:\n\
         {{\"diagram\": \"graph TD\\n    A[Main Component] --> B[Sub Component]\"}}\n\n\
         Rules:\n\
         - Use short labels with only letters, digits, spaces and hyphens\n\
         - No parentheses or nested brackets inside labels\n\
         - Arrows are written A --> B\n\
         - Start with graph TD\n\n\
         README:\n{readme}"
    )
}

#[derive(Deserialize)]
struct DiagramEnvelope {
    diagram: String,
}

fn extract_diagram(response: &str) -> Result<String> {
    let json = extract::json_object(response).context("No JSON object in diagram response")?;
    let envelope: DiagramEnvelope =
        serde_json::from_str(json).context("Failed to parse diagram response")?;
    if !envelope.diagram.trim().starts_with("graph") {
        anyhow::bail!("Diagram does not start with a graph declaration");
    }
    Ok(envelope.diagram)
}
