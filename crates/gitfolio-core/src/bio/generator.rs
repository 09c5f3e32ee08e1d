use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{GitfolioError, Result};
use crate::github::client::is_placeholder_credential;
use crate::github::types::Repository;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const MODEL: &str = "gpt-3.5-turbo";
const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 150;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// How many repository names make it into the prompt
const PROMPT_REPO_LIMIT: usize = 5;

/// A generative-text backend for the "about me" section.
///
/// One call per generation attempt; the resolver owns retries and fallback.
pub trait BioGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;

    /// Install a replacement credential before a retry. Backends without a
    /// credential ignore this.
    fn set_credential(&mut self, _credential: &str) {}
}

/// OpenAI chat-completions backend with fixed model, temperature and length.
pub struct OpenAiGenerator {
    api_url: String,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_api_url(DEFAULT_API_URL, api_key)
    }

    /// Create with a custom endpoint (for testing)
    pub fn with_api_url(api_url: &str, api_key: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GitfolioError::Http(e.to_string()))?;

        Ok(Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }
}

impl BioGenerator for OpenAiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        if is_placeholder_credential(&self.api_key) {
            return Err(GitfolioError::Auth {
                credential: "OPENAI_API_KEY".to_string(),
                message: "no valid API key found".to_string(),
            });
        }

        let body = serde_json::json!({
            "model": MODEL,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .map_err(|e| GitfolioError::Generation {
                message: e.to_string(),
            })?;

        let status = response.status();
        let payload: serde_json::Value =
            response.json().map_err(|e| GitfolioError::Generation {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("service returned an error")
                .to_string();
            return Err(GitfolioError::Generation { message });
        }

        let bio = payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if bio.is_empty() {
            return Err(GitfolioError::Generation {
                message: "service returned an empty completion".to_string(),
            });
        }

        Ok(bio)
    }

    fn set_credential(&mut self, credential: &str) {
        self.api_key = credential.trim().to_string();
    }
}

/// Compose the generation prompt from the fetched profile data.
pub fn compose_prompt(
    username: &str,
    languages: &BTreeMap<String, u64>,
    top_repo: Option<&Repository>,
    repos: &[Repository],
) -> String {
    let language_list = languages.keys().cloned().collect::<Vec<_>>().join(", ");
    let top_name = top_repo.map(|r| r.name.as_str()).unwrap_or("a top project");
    let top_stars = top_repo.map(|r| r.stargazers_count).unwrap_or(0);
    let repo_names = repos
        .iter()
        .take(PROMPT_REPO_LIMIT)
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Generate a short, friendly 'About Me' for a GitHub profile:\n\n\
         Username: {}\n\
         Languages: {}\n\
         Top repo: {} ({} stars)\n\
         Recent repos: {}\n\n\
         Tone: Friendly, developer-focused, 2-3 sentences.",
        username,
        if language_list.is_empty() {
            "N/A"
        } else {
            language_list.as_str()
        },
        top_name,
        top_stars,
        if repo_names.is_empty() {
            "None"
        } else {
            repo_names.as_str()
        },
    )
}

/// Deterministic substitute bio: built from the first known language, or a
/// generic default when no languages are known. Never touches the network.
pub fn fallback_bio(languages: &BTreeMap<String, u64>) -> String {
    let primary = languages
        .keys()
        .next()
        .map(|s| s.as_str())
        .unwrap_or("developer");
    format!(
        "I'm a {} developer passionate about open-source and building cool stuff.",
        primary
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u64) -> Repository {
        Repository {
            name: name.to_string(),
            fork: false,
            language: None,
            stargazers_count: stars,
            html_url: String::new(),
            description: None,
            languages_url: String::new(),
        }
    }

    #[test]
    fn test_fallback_bio_uses_first_language() {
        let mut languages = BTreeMap::new();
        languages.insert("Rust".to_string(), 3);
        languages.insert("Shell".to_string(), 1);
        assert_eq!(
            fallback_bio(&languages),
            "I'm a Rust developer passionate about open-source and building cool stuff."
        );
    }

    #[test]
    fn test_fallback_bio_generic_default() {
        assert_eq!(
            fallback_bio(&BTreeMap::new()),
            "I'm a developer passionate about open-source and building cool stuff."
        );
    }

    #[test]
    fn test_compose_prompt_includes_profile_data() {
        let mut languages = BTreeMap::new();
        languages.insert("Go".to_string(), 1);
        let top = repo("stars", 42);
        let repos = vec![repo("one", 0), repo("two", 0)];

        let prompt = compose_prompt("octocat", &languages, Some(&top), &repos);
        assert!(prompt.contains("Username: octocat"));
        assert!(prompt.contains("Languages: Go"));
        assert!(prompt.contains("Top repo: stars (42 stars)"));
        assert!(prompt.contains("Recent repos: one, two"));
    }

    #[test]
    fn test_compose_prompt_empty_collections() {
        let prompt = compose_prompt("octocat", &BTreeMap::new(), None, &[]);
        assert!(prompt.contains("Languages: N/A"));
        assert!(prompt.contains("Top repo: a top project (0 stars)"));
        assert!(prompt.contains("Recent repos: None"));
    }

    #[test]
    fn test_compose_prompt_caps_repo_names() {
        let repos: Vec<Repository> = (0..8).map(|i| repo(&format!("r{}", i), 0)).collect();
        let prompt = compose_prompt("octocat", &BTreeMap::new(), None, &repos);
        assert!(prompt.contains("r4"));
        assert!(!prompt.contains("r5"));
    }

    #[test]
    fn test_openai_generator_rejects_placeholder_key() {
        let generator = OpenAiGenerator::new("your-key-here").unwrap();
        let err = generator.generate("prompt").unwrap_err();
        assert!(matches!(err, GitfolioError::Auth { .. }));
    }
}
