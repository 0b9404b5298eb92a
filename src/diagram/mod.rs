//! The small line-oriented graph DSL that architecture diagrams come back in.
//!
//! Accepted lines:
//!
//! ```text
//! graph TD                       declaration, skipped
//! A --> B                        connection (also `---` and `--`)
//! A[Label] --> B[Label] : text   connection with node and edge labels
//! A[Label]                       standalone node
//! ```
//!
//! Raw model output goes through [`normalize`] first, then [`parse`].

pub mod normalize;
pub mod parse;

pub use normalize::normalize;
pub use parse::{parse, DiagramEdge, DiagramGraph, DiagramNode};
