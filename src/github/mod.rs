pub mod client;
pub mod profile;
pub mod repo_ref;
pub(crate) mod types;

pub use client::GitHubClient;
pub use repo_ref::RepoRef;
