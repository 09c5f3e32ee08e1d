//! Plugin Registry
//!
//! Optional content contributors, registered explicitly at startup. Each
//! plugin produces at most one text block per run; a failing or panicking
//! plugin is contained at the invocation boundary and surfaces as an
//! error-marker contribution, never aborting the pipeline or the plugins
//! that follow it.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::Settings;
use crate::error::Result;
use crate::github::types::{Commit, Profile, Repository};

/// Where a plugin's output lands in the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Rendered inside the template as an annotated markdown block
    Section,
    /// Freeform text appended after the rendered document
    Appendix,
}

/// Shared read-only aggregate handed to every plugin.
pub struct PluginContext<'a> {
    pub username: &'a str,
    pub profile: &'a Profile,
    pub repositories: &'a [Repository],
    pub languages: &'a BTreeMap<String, u64>,
    pub top_repository: Option<&'a Repository>,
    pub latest_commit: Option<&'a Commit>,
    pub settings: &'a Settings,
}

/// Contribution contract. Implementations must be panic-tolerant from the
/// registry's point of view but are otherwise unconstrained.
pub trait ProfilePlugin {
    fn name(&self) -> &str;

    fn placement(&self) -> Placement {
        Placement::Section
    }

    fn contribute(&self, ctx: &PluginContext) -> Result<String>;
}

/// One plugin's outcome for a run: a text block or an error message.
#[derive(Debug, Clone)]
pub struct PluginContribution {
    pub plugin_name: String,
    pub outcome: std::result::Result<String, String>,
}

/// Registered plugin set, invoked in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn ProfilePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in plugins
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LanguageBadges));
        registry.register(Box::new(FooterNote));
        registry
    }

    pub fn register(&mut self, plugin: Box<dyn ProfilePlugin>) {
        self.plugins.push(plugin);
    }

    /// (name, placement) of every registered plugin, in order
    pub fn plugins(&self) -> Vec<(&str, Placement)> {
        self.plugins
            .iter()
            .map(|p| (p.name(), p.placement()))
            .collect()
    }

    /// Invoke every enabled plugin registered for a placement.
    ///
    /// Plugins disabled in settings are skipped; empty contributions are
    /// dropped. Order follows registration order.
    pub fn invoke(&self, placement: Placement, ctx: &PluginContext) -> Vec<PluginContribution> {
        self.plugins
            .iter()
            .filter(|p| p.placement() == placement)
            .filter(|p| ctx.settings.plugin_enabled(p.name()))
            .filter_map(|p| invoke_one(p.as_ref(), ctx))
            .collect()
    }
}

/// Invoke a single plugin with full fault isolation.
fn invoke_one(plugin: &dyn ProfilePlugin, ctx: &PluginContext) -> Option<PluginContribution> {
    let name = plugin.name().to_string();
    let outcome = match catch_unwind(AssertUnwindSafe(|| plugin.contribute(ctx))) {
        Ok(Ok(text)) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            Ok(text)
        }
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(panic_message(payload)),
    };

    Some(PluginContribution {
        plugin_name: name,
        outcome,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "plugin panicked".to_string()
    }
}

// ========== Built-in plugins ==========

/// Shields.io badge per known language, rendered inside the template.
pub struct LanguageBadges;

impl ProfilePlugin for LanguageBadges {
    fn name(&self) -> &str {
        "language-badges"
    }

    fn contribute(&self, ctx: &PluginContext) -> Result<String> {
        let badges: Vec<String> = ctx
            .languages
            .keys()
            .map(|language| {
                format!(
                    "![{}](https://img.shields.io/badge/-{}-05122A?style=flat)",
                    language,
                    badge_escape(language)
                )
            })
            .collect();
        Ok(badges.join(" "))
    }
}

/// Shields.io badge path escaping: dashes double, spaces percent-encode.
fn badge_escape(label: &str) -> String {
    label.replace('-', "--").replace(' ', "%20")
}

/// Generated-by footer appended after the document.
pub struct FooterNote;

impl ProfilePlugin for FooterNote {
    fn name(&self) -> &str {
        "footer-note"
    }

    fn placement(&self) -> Placement {
        Placement::Appendix
    }

    fn contribute(&self, _ctx: &PluginContext) -> Result<String> {
        Ok("---\n*Generated with [gitfolio](https://github.com/bibekmishra/gitfolio)*".to_string())
    }
}
