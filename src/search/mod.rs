pub mod merge;
pub mod pipeline;

pub use merge::RankedResults;
pub use pipeline::{fetch_and_rank, RelevanceRanker, RepositorySearch, SearchQuery, SearchRequest};
