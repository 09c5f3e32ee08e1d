//! GitHub Data Client
//!
//! Read-only access to the GitHub REST API.
//!
//! - `types`: serde models for the wire format
//! - `client`: blocking HTTP client with token-shape auth selection

pub mod client;
pub mod types;

// Re-exports
pub use client::{auth_header, is_placeholder_credential, GithubClient, DEFAULT_API_BASE};
pub use types::{Commit, CommitAuthor, CommitDetail, Profile, Repository};
