//! Context Builder
//!
//! Pure assembly of the template-ready `RenderContext` from everything the
//! pipeline fetched and computed. Visibility flags are applied here: a field
//! gated by settings is present only when the flag is on AND the data exists.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::Settings;
use crate::github::types::{Commit, Profile, Repository};
use crate::plugins::PluginContribution;

/// API commit timestamp format
const COMMIT_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Human-readable date form used in the document
const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";

const DEFAULT_NAME: &str = "GitHub User";
const DEFAULT_BIO: &str = "Passionate developer on GitHub.";

/// The single aggregate handed to the template. Built fresh every run,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub name: String,
    /// Empty string means "show no about section"
    pub bio: String,
    pub followers: u64,
    pub public_repos: u64,
    pub languages: BTreeMap<String, u64>,
    /// Label -> URL, in fixed platform order
    pub socials: Vec<(String, String)>,
    pub top_repository: Option<TopRepository>,
    pub latest_commit: Option<CommitSummary>,
    /// Annotated markdown blocks, plugin registration order
    pub plugin_blocks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopRepository {
    pub name: String,
    pub url: String,
    pub stars: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub message: String,
    pub date: String,
}

/// Assemble the render context.
///
/// `resolved_bio` is the Bio Resolver's output when AI generation ran:
/// `Some("")` is an explicit skip and suppresses the about section instead
/// of falling through to the profile bio.
#[allow(clippy::too_many_arguments)]
pub fn build_context(
    profile: &Profile,
    languages: &BTreeMap<String, u64>,
    top_repo: Option<&Repository>,
    latest_commit: Option<&Commit>,
    resolved_bio: Option<&str>,
    settings: &Settings,
    section_contributions: &[PluginContribution],
) -> RenderContext {
    let name = settings
        .name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| profile.name.as_deref().filter(|n| !n.trim().is_empty()))
        .map(|n| n.to_string())
        .unwrap_or_else(|| {
            if profile.login.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                profile.login.clone()
            }
        });

    let bio = if settings.show_about {
        resolve_bio(settings, resolved_bio, profile)
    } else {
        String::new()
    };

    let languages = if settings.show_languages {
        languages.clone()
    } else {
        BTreeMap::new()
    };

    let socials = if settings.include_socials {
        build_socials(settings)
    } else {
        Vec::new()
    };

    let top_repository = if settings.show_top_repo {
        top_repo.map(|repo| TopRepository {
            name: repo.name.clone(),
            url: repo.html_url.clone(),
            stars: repo.stargazers_count,
            description: repo
                .description
                .clone()
                .unwrap_or_else(|| "No description.".to_string()),
        })
    } else {
        None
    };

    let latest_commit = if settings.show_latest_commit {
        latest_commit.map(|commit| CommitSummary {
            message: commit.commit.message.clone(),
            date: format_commit_date(&commit.commit.author.date),
        })
    } else {
        None
    };

    let plugin_blocks = section_contributions
        .iter()
        .map(|contribution| match &contribution.outcome {
            Ok(text) => format!("<!-- Plugin: {} -->\n{}", contribution.plugin_name, text),
            Err(message) => format!(
                "<!-- Plugin Error: {} - {} -->",
                contribution.plugin_name, message
            ),
        })
        .collect();

    RenderContext {
        name,
        bio,
        followers: profile.followers,
        public_repos: profile.public_repos,
        languages,
        socials,
        top_repository,
        latest_commit,
        plugin_blocks,
    }
}

fn resolve_bio(settings: &Settings, resolved_bio: Option<&str>, profile: &Profile) -> String {
    if let Some(configured) = settings.bio.as_deref() {
        if !configured.trim().is_empty() {
            return configured.to_string();
        }
    }
    // an explicit skip (Some("")) must not fall through to the profile bio
    if let Some(resolved) = resolved_bio {
        return resolved.to_string();
    }
    profile
        .bio
        .clone()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIO.to_string())
}

/// Social links for non-empty handles only, fixed URL template per platform.
fn build_socials(settings: &Settings) -> Vec<(String, String)> {
    let socials = &settings.socials;
    let mut links = Vec::new();

    let handle = socials.linkedin.trim();
    if !handle.is_empty() {
        links.push((
            "LinkedIn".to_string(),
            format!("https://linkedin.com/in/{}", handle),
        ));
    }
    let handle = socials.twitter.trim();
    if !handle.is_empty() {
        links.push((
            "Twitter".to_string(),
            format!("https://twitter.com/{}", handle),
        ));
    }
    let handle = socials.email.trim();
    if !handle.is_empty() {
        links.push(("Email".to_string(), format!("mailto:{}", handle)));
    }
    let handle = socials.portfolio.trim();
    if !handle.is_empty() {
        links.push(("Portfolio".to_string(), handle.to_string()));
    }

    links
}

/// Reformat the API's fixed timestamp into a readable date; an unparseable
/// value is passed through verbatim.
pub fn format_commit_date(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, COMMIT_DATE_FORMAT) {
        Ok(parsed) => parsed.format(DISPLAY_DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
