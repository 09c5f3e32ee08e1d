use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GitfolioError, Result};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# gitfolio configuration file
# Location: ~/.gitfolio/config.toml

# GitHub account the README is generated for
# github_username = "octocat"

# Explicit display name (falls back to the GitHub profile name, then login)
# name = "Mona Lisa"

# Explicit "about me" text. When set, it wins over any AI-generated or
# profile-sourced bio.
# bio = "Passionate developer on GitHub."

# Generate the "about me" section with an AI service (needs OPENAI_API_KEY)
use_ai = false

# Template used for rendering. Built-ins: default, minimal, compact.
# Files in ~/.gitfolio/templates/<name>.md override built-ins.
template = "default"

# Section visibility
show_about = true
show_top_repo = true
show_latest_commit = true
show_languages = true
include_socials = true

[socials]
# Only non-empty handles are rendered
linkedin = ""
twitter = ""
email = ""
portfolio = ""

[plugins]
# Registered plugins are enabled unless listed as false here
# language-badges = false
"#;

/// Persisted settings controlling what the generated README contains.
///
/// The core pipeline treats this as read-only input; only the CLI mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_username: Option<String>,

    /// Explicit display-name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Explicit bio; wins over generated and profile bios
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default)]
    pub use_ai: bool,

    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default = "default_true")]
    pub show_about: bool,

    #[serde(default = "default_true")]
    pub show_top_repo: bool,

    #[serde(default = "default_true")]
    pub show_latest_commit: bool,

    #[serde(default = "default_true")]
    pub show_languages: bool,

    #[serde(default = "default_true")]
    pub include_socials: bool,

    #[serde(default)]
    pub socials: Socials,

    /// Plugin name -> enabled; absent plugins default to enabled
    #[serde(default)]
    pub plugins: BTreeMap<String, bool>,
}

/// Social handles; empty strings are treated as "not configured"
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub portfolio: String,
}

fn default_template() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            github_username: None,
            name: None,
            bio: None,
            use_ai: false,
            template: default_template(),
            show_about: true,
            show_top_repo: true,
            show_latest_commit: true,
            show_languages: true,
            include_socials: true,
            socials: Socials::default(),
            plugins: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let settings: Settings =
            toml::from_str(&content).map_err(|e| GitfolioError::ConfigParse {
                path: path.clone(),
                message: e.to_string(),
            })?;

        Ok(settings)
    }

    /// Save settings to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self).map_err(|e| GitfolioError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Directory holding user template overrides
    pub fn templates_dir(base_dir: &Path) -> PathBuf {
        base_dir.join("templates")
    }

    /// Whether a plugin is enabled; plugins not mentioned in config are on
    pub fn plugin_enabled(&self, name: &str) -> bool {
        self.plugins.get(name).copied().unwrap_or(true)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "github_username" => Some(self.github_username.clone().unwrap_or_default()),
            "name" => Some(self.name.clone().unwrap_or_default()),
            "bio" => Some(self.bio.clone().unwrap_or_default()),
            "use_ai" => Some(self.use_ai.to_string()),
            "template" => Some(self.template.clone()),
            "show_about" => Some(self.show_about.to_string()),
            "show_top_repo" => Some(self.show_top_repo.to_string()),
            "show_latest_commit" => Some(self.show_latest_commit.to_string()),
            "show_languages" => Some(self.show_languages.to_string()),
            "include_socials" => Some(self.include_socials.to_string()),
            "socials.linkedin" => Some(self.socials.linkedin.clone()),
            "socials.twitter" => Some(self.socials.twitter.clone()),
            "socials.email" => Some(self.socials.email.clone()),
            "socials.portfolio" => Some(self.socials.portfolio.clone()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "github_username" => self.github_username = non_empty(value),
            "name" => self.name = non_empty(value),
            "bio" => self.bio = non_empty(value),
            "use_ai" => self.use_ai = parse_bool(key, value)?,
            "template" => self.template = value.to_string(),
            "show_about" => self.show_about = parse_bool(key, value)?,
            "show_top_repo" => self.show_top_repo = parse_bool(key, value)?,
            "show_latest_commit" => self.show_latest_commit = parse_bool(key, value)?,
            "show_languages" => self.show_languages = parse_bool(key, value)?,
            "include_socials" => self.include_socials = parse_bool(key, value)?,
            "socials.linkedin" => self.socials.linkedin = value.to_string(),
            "socials.twitter" => self.socials.twitter = value.to_string(),
            "socials.email" => self.socials.email = value.to_string(),
            "socials.portfolio" => self.socials.portfolio = value.to_string(),
            _ => {
                return Err(GitfolioError::ConfigKeyNotFound {
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        [
            "github_username",
            "name",
            "bio",
            "use_ai",
            "template",
            "show_about",
            "show_top_repo",
            "show_latest_commit",
            "show_languages",
            "include_socials",
            "socials.linkedin",
            "socials.twitter",
            "socials.email",
            "socials.portfolio",
        ]
        .iter()
        .map(|key| (key.to_string(), self.get(key).unwrap_or_default()))
        .collect()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(GitfolioError::ConfigParse {
            path: PathBuf::from(CONFIG_FILE),
            message: format!("expected a boolean for '{}', got '{}'", key, value),
        }),
    }
}
