//! GitHub API wire-format models
//!
//! Field names match the REST API payloads; everything the API may omit is
//! defaulted so a sparse record still deserializes.

use serde::{Deserialize, Serialize};

/// User profile record (`/users/{username}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub public_repos: u64,
}

/// Repository record (`/users/{username}/repos`)
///
/// The collection arrives sorted by the remote service; consumers must not
/// assume any particular order beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub fork: bool,
    /// Primary language; None when GitHub has not classified the repo
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub languages_url: String,
}

/// Commit record (`/repos/{owner}/{repo}/commits`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitAuthor {
    /// Fixed API timestamp format, e.g. "2024-05-03T12:00:00Z"
    #[serde(default)]
    pub date: String,
}
