//! Run orchestration
//!
//! Wires the fetch sequence, statistics, bio resolution, plugins, context
//! assembly and rendering into one README generation run. A remote failure
//! during the primary fetch aborts the run with nothing written; everything
//! downstream degrades instead of aborting.

use crate::bio::{BioCache, BioGenerator, BioRequest, BioResolver, RecoveryPrompt};
use crate::config::Settings;
use crate::context::build_context;
use crate::error::{GitfolioError, Result};
use crate::github::types::{Commit, Profile, Repository};
use crate::github::GithubClient;
use crate::plugins::{Placement, PluginContext, PluginRegistry};
use crate::stats;
use crate::template::TemplateStore;

/// Everything pulled from the remote service for one run.
pub struct FetchedData {
    pub profile: Profile,
    pub repositories: Vec<Repository>,
    pub latest_commit: Option<Commit>,
}

/// One README generation run.
pub struct ReadmeGenerator<'a> {
    client: &'a GithubClient,
    settings: &'a Settings,
    cache: &'a BioCache,
    registry: &'a PluginRegistry,
    templates: &'a TemplateStore,
}

impl<'a> ReadmeGenerator<'a> {
    pub fn new(
        client: &'a GithubClient,
        settings: &'a Settings,
        cache: &'a BioCache,
        registry: &'a PluginRegistry,
        templates: &'a TemplateStore,
    ) -> Self {
        Self {
            client,
            settings,
            cache,
            registry,
            templates,
        }
    }

    /// Full pipeline: fetch, resolve the bio, assemble the document.
    pub fn generate(
        &self,
        username: &str,
        bio_generator: Option<&mut dyn BioGenerator>,
        recovery: &mut dyn RecoveryPrompt,
        template_override: Option<&str>,
    ) -> Result<String> {
        let data = self.fetch(username)?;

        let resolved_bio = if self.settings.use_ai {
            let languages = stats::language_counts(&data.repositories);
            let request = BioRequest {
                username,
                languages: &languages,
                top_repository: stats::top_starred(&data.repositories),
                repositories: &data.repositories,
            };
            Some(BioResolver::new(self.cache).resolve(&request, bio_generator, recovery))
        } else {
            None
        };

        Ok(self.assemble(username, &data, resolved_bio.as_deref(), template_override))
    }

    /// Primary fetch sequence. Any API failure here aborts the run.
    pub fn fetch(&self, username: &str) -> Result<FetchedData> {
        let profile = self.client.fetch_profile(username)?;
        let repositories = self.client.fetch_repositories(username)?;
        let latest_commit = stats::latest_commit(&repositories, |repo| {
            self.client.fetch_commits(username, &repo.name)
        });

        Ok(FetchedData {
            profile,
            repositories,
            latest_commit,
        })
    }

    /// Assemble and render the document from already-fetched data.
    ///
    /// Infallible: a template problem degrades to an explanatory document
    /// body and plugin failures are inline markers.
    pub fn assemble(
        &self,
        username: &str,
        data: &FetchedData,
        resolved_bio: Option<&str>,
        template_override: Option<&str>,
    ) -> String {
        let languages = stats::language_counts(&data.repositories);
        let top_repository = stats::top_starred(&data.repositories);

        let plugin_ctx = PluginContext {
            username,
            profile: &data.profile,
            repositories: &data.repositories,
            languages: &languages,
            top_repository,
            latest_commit: data.latest_commit.as_ref(),
            settings: self.settings,
        };
        let sections = self.registry.invoke(Placement::Section, &plugin_ctx);

        let ctx = build_context(
            &data.profile,
            &languages,
            top_repository,
            data.latest_commit.as_ref(),
            resolved_bio,
            self.settings,
            &sections,
        );

        let template_name = template_override.unwrap_or(&self.settings.template);
        let mut document = match self.templates.render(template_name, &ctx) {
            Ok(body) => body,
            Err(GitfolioError::Template { name, message }) => format!(
                "Template '{}' could not be rendered: {}. Check your config.",
                name, message
            ),
            // only template errors come out of render
            Err(other) => other.to_string(),
        };

        for contribution in self.registry.invoke(Placement::Appendix, &plugin_ctx) {
            document.push_str("\n\n");
            match &contribution.outcome {
                Ok(text) => document.push_str(text),
                Err(message) => document.push_str(&format!(
                    "<!-- Plugin Error: {} - {} -->",
                    contribution.plugin_name, message
                )),
            }
        }

        document.push('\n');
        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{CommitAuthor, CommitDetail};
    use tempfile::TempDir;

    fn repo(name: &str, stars: u64, fork: bool, language: Option<&str>) -> Repository {
        Repository {
            name: name.to_string(),
            fork,
            language: language.map(|l| l.to_string()),
            stargazers_count: stars,
            html_url: format!("https://github.com/octocat/{}", name),
            description: Some(format!("The {} project", name)),
            languages_url: String::new(),
        }
    }

    fn fetched() -> FetchedData {
        FetchedData {
            profile: Profile {
                login: "octocat".to_string(),
                name: Some("The Octocat".to_string()),
                bio: Some("I live on GitHub.".to_string()),
                followers: 100,
                public_repos: 8,
            },
            repositories: vec![
                repo("a", 3, false, Some("Go")),
                repo("b", 7, false, Some("Rust")),
            ],
            latest_commit: Some(Commit {
                commit: CommitDetail {
                    message: "Tend the garden".to_string(),
                    author: CommitAuthor {
                        date: "2024-05-03T12:00:00Z".to_string(),
                    },
                },
            }),
        }
    }

    struct Fixture {
        _tmp: TempDir,
        client: GithubClient,
        settings: Settings,
        cache_dir: std::path::PathBuf,
        templates_dir: std::path::PathBuf,
    }

    fn fixture() -> Fixture {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().to_path_buf();
        let templates_dir = tmp.path().join("templates");
        Fixture {
            client: GithubClient::with_base_url("http://localhost:1", "t").unwrap(),
            settings: Settings::default(),
            cache_dir,
            templates_dir,
            _tmp: tmp,
        }
    }

    #[test]
    fn test_assemble_round_trip() {
        let fx = fixture();
        let cache = BioCache::new(&fx.cache_dir);
        let registry = PluginRegistry::with_defaults();
        let templates = TemplateStore::new(fx.templates_dir.clone());
        let generator =
            ReadmeGenerator::new(&fx.client, &fx.settings, &cache, &registry, &templates);

        let document = generator.assemble("octocat", &fetched(), None, None);

        // top repository is "b" with 7 stars; languages count one each
        assert!(document.contains("# Hi there, I'm The Octocat"));
        assert!(document.contains("[b](https://github.com/octocat/b) (7 stars)"));
        assert!(document.contains("- Go: 1 repo"));
        assert!(document.contains("- Rust: 1 repo"));
        assert!(document.contains("Tend the garden (03 May 2024)"));
        assert!(document.contains("<!-- Plugin: language-badges -->"));
        assert!(document.contains("Generated with [gitfolio]"));
        assert!(document.ends_with('\n'));
    }

    #[test]
    fn test_assemble_unknown_template_degrades() {
        let mut fx = fixture();
        fx.settings.template = "no-such-template".to_string();
        let cache = BioCache::new(&fx.cache_dir);
        let registry = PluginRegistry::new();
        let templates = TemplateStore::new(fx.templates_dir.clone());
        let generator =
            ReadmeGenerator::new(&fx.client, &fx.settings, &cache, &registry, &templates);

        let document = generator.assemble("octocat", &fetched(), None, None);
        assert!(document.contains("Template 'no-such-template' could not be rendered"));
    }

    #[test]
    fn test_assemble_template_override() {
        let fx = fixture();
        let cache = BioCache::new(&fx.cache_dir);
        let registry = PluginRegistry::new();
        let templates = TemplateStore::new(fx.templates_dir.clone());
        let generator =
            ReadmeGenerator::new(&fx.client, &fx.settings, &cache, &registry, &templates);

        let document = generator.assemble("octocat", &fetched(), None, Some("minimal"));
        assert!(document.starts_with("# The Octocat"));
        assert!(!document.contains("## Top Repository"));
    }

    #[test]
    fn test_assemble_resolved_bio_wins_over_profile() {
        let fx = fixture();
        let cache = BioCache::new(&fx.cache_dir);
        let registry = PluginRegistry::new();
        let templates = TemplateStore::new(fx.templates_dir.clone());
        let generator =
            ReadmeGenerator::new(&fx.client, &fx.settings, &cache, &registry, &templates);

        let document = generator.assemble("octocat", &fetched(), Some("Generated text."), None);
        assert!(document.contains("## About Me\n\nGenerated text."));

        let skipped = generator.assemble("octocat", &fetched(), Some(""), None);
        assert!(!skipped.contains("## About Me"));
    }
}
