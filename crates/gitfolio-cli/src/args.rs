use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gitfolio")]
#[command(about = "GitHub profile README generator")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.gitfolio)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate README.md from live GitHub data
    Generate {
        /// Template override for this run
        #[arg(long)]
        theme: Option<String>,
    },

    /// Render the README without writing README.md
    Preview {
        /// Save to preview.md instead of printing
        #[arg(long)]
        save: bool,

        /// Template override for this run
        #[arg(long)]
        theme: Option<String>,
    },

    /// Show language byte totals across non-fork repositories
    Languages,

    /// List registered plugins
    Plugins,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Enable or disable a plugin
    Plugin {
        #[command(subcommand)]
        action: PluginAction,
    },

    /// Manage the active template
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a commented default config file
    Init,

    /// Show all config values
    Show,

    /// Reset config to defaults
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Get a single config value
    Get {
        /// Dot-notation key (e.g. socials.twitter)
        key: String,
    },

    /// Set a single config value
    Set {
        /// Dot-notation key (e.g. socials.twitter)
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
pub enum PluginAction {
    /// Enable a plugin
    Enable { name: String },

    /// Disable a plugin
    Disable { name: String },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// List available templates
    List,

    /// Switch the active template
    Switch { name: String },
}
