use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{GitfolioError, Result};
use crate::github::types::{Commit, Profile, Repository};

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("gitfolio/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed page size for the repository listing; a single page only.
const REPOS_PER_PAGE: u32 = 100;

/// Build the Authorization header value for a GitHub token.
///
/// Fine-grained and OAuth-app tokens use the bearer scheme; everything else
/// falls back to the legacy `token` scheme.
pub fn auth_header(token: &str) -> String {
    if token.starts_with("github_pat_") || token.starts_with("gho_") {
        format!("Bearer {}", token)
    } else {
        format!("token {}", token)
    }
}

/// Whether a credential looks unset or like a template placeholder.
pub fn is_placeholder_credential(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    lowered.is_empty() || lowered.contains("your") || lowered.contains("placeholder")
}

/// Blocking client for the GitHub REST API.
///
/// Read-only; no retry, no pagination. Non-2xx responses surface as
/// `RemoteApi` and the caller decides whether to re-prompt or abort.
pub struct GithubClient {
    base_url: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl GithubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE, token)
    }

    /// Create with a custom API base URL (for testing)
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitfolioError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fetch the profile record for a username
    pub fn fetch_profile(&self, username: &str) -> Result<Profile> {
        self.get_json(&format!("{}/users/{}", self.base_url, username))
    }

    /// Fetch one page of repositories, most recently updated first
    pub fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>> {
        self.get_json(&format!(
            "{}/users/{}/repos?per_page={}&sort=updated",
            self.base_url, username, REPOS_PER_PAGE
        ))
    }

    /// Fetch the commit list for a repository
    pub fn fetch_commits(&self, owner: &str, repo_name: &str) -> Result<Vec<Commit>> {
        self.get_json(&format!(
            "{}/repos/{}/{}/commits",
            self.base_url, owner, repo_name
        ))
    }

    /// Fetch the per-language byte breakdown for one repository
    pub fn fetch_language_breakdown(&self, repo: &Repository) -> Result<BTreeMap<String, u64>> {
        self.get_json(&repo.languages_url)
    }

    /// Live token check against `/user`; returns the authenticated login.
    pub fn validate_token(&self) -> Result<String> {
        let profile: Profile = self.get_json(&format!("{}/user", self.base_url))?;
        Ok(profile.login)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header("Authorization", auth_header(&self.token))
            .send()
            .map_err(|e| GitfolioError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GitfolioError::RemoteApi {
                status: status.as_u16(),
                message: extract_api_message(response),
            });
        }

        response
            .json()
            .map_err(|e| GitfolioError::Http(e.to_string()))
    }
}

/// Pull the `message` field out of an error payload, falling back to the
/// raw body or the bare status text.
fn extract_api_message(response: reqwest::blocking::Response) -> String {
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    let body = match response.text() {
        Ok(body) => body,
        Err(_) => return status_text,
    };

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        status_text
    } else {
        body
    }
}
