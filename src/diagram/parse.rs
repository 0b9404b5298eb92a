use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(graph|flowchart|subgraph|end|style)").expect("valid regex"));
static CONNECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*(-->|---|--)\s*(.+?)(?:\s*:\s*(.+))?$").expect("valid regex")
});
/// Prefix match: `B --> C` as a target still yields node `B`.
static NODE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)(?:\[([^\]]+)\])?").expect("valid regex"));
static STANDALONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)(?:\[([^\]]+)\])?$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Nodes in first-seen order, edges in source-line order.
///
/// When the same id appears twice with different bracketed labels, the
/// first label is kept. "Last one wins" would be just as defensible; callers
/// that need it must rename nodes upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramGraph {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl DiagramGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Parse normalized diagram text into a graph. Lines outside the accepted
/// grammar are skipped; the result may be empty.
pub fn parse(text: &str) -> DiagramGraph {
    let mut builder = GraphBuilder::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if DECLARATION.is_match(line) {
            continue;
        }

        if let Some(caps) = CONNECTION.captures(line) {
            let (Some(source), Some(target)) = (node_ref(&caps[1]), node_ref(&caps[3])) else {
                tracing::debug!("Skipping diagram line with unusable endpoint: {line}");
                continue;
            };
            let label = caps
                .get(4)
                .map(|m| m.as_str().trim().to_string())
                .filter(|l| !l.is_empty());

            builder.add_node(source.clone());
            builder.add_node(target.clone());
            builder.edges.push(DiagramEdge {
                source: source.id,
                target: target.id,
                label,
            });
            continue;
        }

        if !line.contains("--") {
            if let Some(caps) = STANDALONE.captures(line) {
                builder.add_node(node_from_captures(&caps));
            }
        }
    }

    DiagramGraph {
        nodes: builder.nodes,
        edges: builder.edges,
    }
}

#[derive(Default)]
struct GraphBuilder {
    seen: HashSet<String>,
    nodes: Vec<DiagramNode>,
    edges: Vec<DiagramEdge>,
}

impl GraphBuilder {
    fn add_node(&mut self, node: DiagramNode) {
        if self.seen.insert(node.id.clone()) {
            self.nodes.push(node);
        }
    }
}

fn node_ref(fragment: &str) -> Option<DiagramNode> {
    NODE_REF
        .captures(fragment.trim())
        .map(|caps| node_from_captures(&caps))
}

fn node_from_captures(caps: &regex::Captures<'_>) -> DiagramNode {
    let id = caps[1].to_string();
    let label = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| id.clone());
    DiagramNode { id, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(graph: &DiagramGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_simple_chain() {
        let graph = parse("graph TD\nA[Web App] --> B[API]\nB --> C[Database]");
        assert_eq!(ids(&graph), vec!["A", "B", "C"]);
        assert_eq!(graph.node("A").unwrap().label, "Web App");
        assert_eq!(graph.node("B").unwrap().label, "API");
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].source, "B");
        assert_eq!(graph.edges[1].target, "C");
        assert_eq!(graph.edges[1].label, None);
    }

    #[test]
    fn test_first_label_wins() {
        let graph = parse("A[First] --> B\nA[Second] --> C");
        let a_nodes: Vec<_> = graph.nodes.iter().filter(|n| n.id == "A").collect();
        assert_eq!(a_nodes.len(), 1);
        assert_eq!(a_nodes[0].label, "First");
        assert_eq!(ids(&graph), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_edge_label_after_colon() {
        let graph = parse("A[Client] --> B[Server] : HTTPS requests");
        assert_eq!(graph.edges[0].label.as_deref(), Some("HTTPS requests"));
    }

    #[test]
    fn test_all_arrow_kinds() {
        let graph = parse("A --> B\nB --- C\nC -- D");
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(ids(&graph), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_parallel_edges_preserved() {
        let graph = parse("A --> B\nA --> B : again");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.edges[1].label.as_deref(), Some("again"));
    }

    #[test]
    fn test_standalone_nodes() {
        let graph = parse("flowchart LR\nCache[Redis Cache]\nWorker\nWorker --> Cache");
        assert_eq!(ids(&graph), vec!["Cache", "Worker"]);
        assert_eq!(graph.node("Cache").unwrap().label, "Redis Cache");
        assert_eq!(graph.node("Worker").unwrap().label, "Worker");
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_declarations_are_skipped() {
        let graph = parse("graph TD\nsubgraph Backend\nA --> B\nend\nstyle A fill:#f9f\nFLOWCHART TB");
        assert_eq!(ids(&graph), vec!["A", "B"]);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn test_declaration_prefix_matches_identifiers_too() {
        let graph = parse("endpoint --> handler");
        assert!(graph.is_empty());
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let graph = parse("%% a comment\n\"quoted\" --> B\nclassDef foo fill:#fff\n??");
        assert!(graph.nodes.iter().all(|n| n.id != "\"quoted\""));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("graph TD").is_empty());
    }

    #[test]
    fn test_parse_after_normalize() {
        let raw = "graph TD\r\n  A[Name(extra)suffix] --> B[Store <i>v2</i>]\r\n---\r\n";
        let graph = parse(&crate::diagram::normalize(raw));
        assert_eq!(graph.node("A").unwrap().label, "Namesuffix");
        assert_eq!(graph.node("B").unwrap().label, "Store v2");
    }
}
