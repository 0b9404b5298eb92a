//! # what-to-build
//!
//! A web service that helps developers find projects to work on: it searches
//! GitHub, ranks the results with an LLM, summarizes and diagrams
//! repositories, drafts READMEs, and pits two GitHub profiles against each
//! other.
//!
//! ## Architecture
//!
//! The search pipeline accumulates ranked results across "load more" pages:
//!
//! ```text
//!                   ┌──────────────────────┐
//!                   │  Query + page + lang │
//!                   └──────────┬───────────┘
//!                              │ keywords = whitespace split
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │  GitHub search API   │──── error ──▶ Err(Upstream)
//!                   │  sort=stars, 1 page  │
//!                   └──────────┬───────────┘
//!                              │ empty ──▶ [] / has_more=false
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │  LLM relevance rank  │──── error ──▶ Degraded:
//!                   │  id → score, reason  │               batch by stars
//!                   └──────────┬───────────┘
//!                              │
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │  Merge by repo id    │
//!                   │  into accumulator    │
//!                   └──────────┬───────────┘
//!                              │
//!                              ▼
//!                   ┌──────────────────────┐
//!                   │ Stable sort by score │
//!                   │ (unranked = 0)       │
//!                   └──────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server, GitHub and LLM
//! - [`models`] - Shared data types and request/response types
//! - [`error`] - `FailureKind` and the `Outcome` of pipelines with fallbacks
//! - [`search`] - Search-and-rank pipeline and merge-by-id accumulator
//! - [`compare`] - Badges, scores, winner and roast for two users
//! - [`analyze`] - Per-file summaries of a repository
//! - [`readme`] - README drafting from sampled repository files
//! - [`diagram`] - Flowchart text normalizer and graph parser
//! - [`github`] - GitHub REST/GraphQL client
//! - [`llm`] - Gemini, Ollama and OpenAI-compatible completions and prompts
//! - [`cache`] - Session caches with an explicit eviction policy
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state

pub mod analyze;
pub mod api;
pub mod cache;
pub mod compare;
pub mod config;
pub mod diagram;
pub mod error;
pub mod github;
pub mod llm;
pub mod models;
pub mod readme;
pub mod search;
pub mod state;
