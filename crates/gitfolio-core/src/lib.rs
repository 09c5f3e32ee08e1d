pub mod bio;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod github;
pub mod plugins;
pub mod stats;
pub mod template;

pub use bio::{
    compose_prompt, fallback_bio, BioCache, BioGenerator, BioRequest, BioResolver,
    OpenAiGenerator, RecoveryChoice, RecoveryPrompt,
};
pub use config::{Settings, Socials};
pub use context::{build_context, CommitSummary, RenderContext, TopRepository};
pub use error::{GitfolioError, Result};
pub use generator::{FetchedData, ReadmeGenerator};
pub use github::{
    auth_header, is_placeholder_credential, Commit, GithubClient, Profile, Repository,
    DEFAULT_API_BASE,
};
pub use plugins::{
    Placement, PluginContext, PluginContribution, PluginRegistry, ProfilePlugin,
};
pub use stats::{language_bytes, language_counts, latest_commit, top_starred};
pub use template::TemplateStore;
