//! Template Renderer glue
//!
//! Templates are markdown skeletons with `{{placeholder}}` slots; the slots
//! are pre-rendered section fragments derived from the `RenderContext`, so
//! conditional logic (hidden sections, absent data) lives in the fragment
//! builder, not in template syntax. A file `<templates_dir>/<name>.md`
//! overrides the built-in of the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::context::RenderContext;
use crate::error::{GitfolioError, Result};

const DEFAULT_TEMPLATE: &str = "\
# Hi there, I'm {{name}}

{{about_section}}

{{socials_line}}

- Followers: {{followers}}
- Public repos: {{public_repos}}

{{languages_section}}

{{top_repo_section}}

{{latest_commit_section}}

{{plugin_blocks}}
";

const MINIMAL_TEMPLATE: &str = "\
# {{name}}

{{bio}}

{{socials_line}}
";

const COMPACT_TEMPLATE: &str = "\
# {{name}}

{{about_section}}

**Followers:** {{followers}} | **Public repos:** {{public_repos}}

{{languages_section}}

{{plugin_blocks}}
";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("default", DEFAULT_TEMPLATE),
    ("minimal", MINIMAL_TEMPLATE),
    ("compact", COMPACT_TEMPLATE),
];

/// Named templates: built-ins plus user overrides from a templates directory.
pub struct TemplateStore {
    templates_dir: PathBuf,
}

impl TemplateStore {
    pub fn new(templates_dir: PathBuf) -> Self {
        Self { templates_dir }
    }

    /// Available template names, user files and built-ins merged and sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_TEMPLATES
            .iter()
            .map(|(name, _)| name.to_string())
            .collect();

        if let Ok(entries) = fs::read_dir(&self.templates_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "md") {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        names.push(stem.to_string());
                    }
                }
            }
        }

        names.sort();
        names.dedup();
        names
    }

    /// Render a context through the named template.
    pub fn render(&self, name: &str, ctx: &RenderContext) -> Result<String> {
        let source = self.load(name)?;
        let slots = build_slots(ctx);

        let mut rendered = substitute(name, &source, &slots)?;
        rendered = collapse_blank_lines(&rendered);
        Ok(rendered.trim().to_string())
    }

    fn load(&self, name: &str) -> Result<String> {
        let override_path = self.templates_dir.join(format!("{}.md", name));
        if override_path.exists() {
            return fs::read_to_string(&override_path).map_err(|e| GitfolioError::Template {
                name: name.to_string(),
                message: e.to_string(),
            });
        }

        BUILTIN_TEMPLATES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, source)| source.to_string())
            .ok_or_else(|| GitfolioError::Template {
                name: name.to_string(),
                message: "not found".to_string(),
            })
    }
}

fn build_slots(ctx: &RenderContext) -> BTreeMap<&'static str, String> {
    let mut slots = BTreeMap::new();
    slots.insert("name", ctx.name.clone());
    slots.insert("bio", ctx.bio.clone());
    slots.insert("followers", ctx.followers.to_string());
    slots.insert("public_repos", ctx.public_repos.to_string());
    slots.insert("about_section", about_section(ctx));
    slots.insert("socials_line", socials_line(ctx));
    slots.insert("languages_section", languages_section(ctx));
    slots.insert("top_repo_section", top_repo_section(ctx));
    slots.insert("latest_commit_section", latest_commit_section(ctx));
    slots.insert("plugin_blocks", ctx.plugin_blocks.join("\n\n"));
    slots
}

fn about_section(ctx: &RenderContext) -> String {
    if ctx.bio.is_empty() {
        String::new()
    } else {
        format!("## About Me\n\n{}", ctx.bio)
    }
}

/// Socials joined as inline markdown links
fn socials_line(ctx: &RenderContext) -> String {
    ctx.socials
        .iter()
        .map(|(label, url)| format!("[{}]({})", label, url))
        .collect::<Vec<_>>()
        .join(" • ")
}

fn languages_section(ctx: &RenderContext) -> String {
    if ctx.languages.is_empty() {
        return String::new();
    }
    let mut lines = vec!["## Languages".to_string(), String::new()];
    for (language, count) in &ctx.languages {
        let unit = if *count == 1 { "repo" } else { "repos" };
        lines.push(format!("- {}: {} {}", language, count, unit));
    }
    lines.join("\n")
}

fn top_repo_section(ctx: &RenderContext) -> String {
    match &ctx.top_repository {
        Some(top) => format!(
            "## Top Repository\n\n[{}]({}) ({} stars)\n\n{}",
            top.name, top.url, top.stars, top.description
        ),
        None => String::new(),
    }
}

fn latest_commit_section(ctx: &RenderContext) -> String {
    match &ctx.latest_commit {
        Some(commit) => {
            // first line only; full messages can be arbitrarily long
            let subject = commit.message.lines().next().unwrap_or_default();
            format!("## Latest Commit\n\n{} ({})", subject, commit.date)
        }
        None => String::new(),
    }
}

/// Replace every `{{key}}` with its slot value; an unrecognized key is a
/// malformed template.
fn substitute(
    template_name: &str,
    source: &str,
    slots: &BTreeMap<&'static str, String>,
) -> Result<String> {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(GitfolioError::Template {
                name: template_name.to_string(),
                message: "unclosed '{{' placeholder".to_string(),
            });
        };
        let key = after[..end].trim();
        match slots.get(key) {
            Some(value) => output.push_str(value),
            None => {
                return Err(GitfolioError::Template {
                    name: template_name.to_string(),
                    message: format!("unknown placeholder '{{{{{}}}}}'", key),
                });
            }
        }
        rest = &after[end + 2..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Empty sections leave runs of blank lines behind; squeeze them to one.
fn collapse_blank_lines(text: &str) -> String {
    let mut collapsed = text.to_string();
    while collapsed.contains("\n\n\n") {
        collapsed = collapsed.replace("\n\n\n", "\n\n");
    }
    collapsed
}
