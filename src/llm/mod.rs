pub mod client;
pub mod diagram;
pub mod extract;
pub mod rank;
pub mod roast;
pub mod summarize;

pub use client::{LlmClient, TextCompletion};
