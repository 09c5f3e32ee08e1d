use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;

use gitfolio_core::bio::{BioCache, BioGenerator, OpenAiGenerator, RecoveryChoice, RecoveryPrompt};
use gitfolio_core::config::Settings;
use gitfolio_core::generator::ReadmeGenerator;
use gitfolio_core::github::{is_placeholder_credential, GithubClient};
use gitfolio_core::plugins::{Placement, PluginRegistry};
use gitfolio_core::template::TemplateStore;
use gitfolio_core::{stats, GitfolioError, Result};

mod args;
use args::{Cli, Commands, ConfigAction, PluginAction, Shell, ThemeAction};

const README_PATH: &str = "README.md";
const PREVIEW_PATH: &str = "preview.md";
const ENV_PATH: &str = ".env";

fn main() -> ExitCode {
    // pick up GITHUB_TOKEN / OPENAI_API_KEY from a local .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let base_dir = resolve_base_dir(cli.base_dir);

    let result = match cli.command {
        Some(Commands::Generate { theme }) => {
            handle_generate(&base_dir, theme.as_deref(), cli.verbose, cli.quiet)
        }
        Some(Commands::Preview { save, theme }) => {
            handle_preview(&base_dir, save, theme.as_deref(), cli.verbose, cli.quiet)
        }
        Some(Commands::Languages) => handle_languages(&base_dir, cli.verbose),
        Some(Commands::Plugins) => handle_plugins(&base_dir),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Plugin { action }) => handle_plugin(action, &base_dir),
        Some(Commands::Theme { action }) => handle_theme(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("GITFOLIO_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".gitfolio"))
        .unwrap_or_else(|| PathBuf::from(".gitfolio"))
}

// ========== Commands ==========

fn handle_generate(base_dir: &Path, theme: Option<&str>, verbose: bool, quiet: bool) -> Result<()> {
    let content = run_pipeline(base_dir, theme, verbose, quiet)?;

    fs::write(README_PATH, &content)?;
    if !quiet {
        println!();
        println!("{} {}", "Generated:".green().bold(), README_PATH);
    }
    Ok(())
}

fn handle_preview(
    base_dir: &Path,
    save: bool,
    theme: Option<&str>,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    if let Some(theme) = theme {
        println!("Using template override: {}", theme.cyan());
    }

    let content = run_pipeline(base_dir, theme, verbose, quiet)?;

    if save {
        fs::write(PREVIEW_PATH, &content)?;
        println!();
        println!("{} {}", "Preview saved:".green().bold(), PREVIEW_PATH);
    } else {
        println!();
        println!("{}", content);
    }
    Ok(())
}

/// Shared generate/preview body: resolve credentials, run the pipeline,
/// return the rendered document.
fn run_pipeline(base_dir: &Path, theme: Option<&str>, verbose: bool, quiet: bool) -> Result<String> {
    let mut settings = Settings::load(base_dir)?;
    let username = resolve_username(&mut settings, base_dir)?;
    let token = ensure_github_token(verbose)?;

    let client = GithubClient::new(&token)?;
    let cache = BioCache::new(base_dir);
    let registry = PluginRegistry::with_defaults();
    let templates = TemplateStore::new(Settings::templates_dir(base_dir));
    let generator = ReadmeGenerator::new(&client, &settings, &cache, &registry, &templates);

    if !quiet {
        println!();
        println!("Generating README for {}...", username.cyan().bold());
    }

    let mut ai = build_ai_generator(&settings);
    if settings.use_ai && verbose {
        println!("Attempting to generate the About Me section...");
    }
    let mut recovery = StdinRecovery;

    generator.generate(
        &username,
        ai.as_mut().map(|g| g as &mut dyn BioGenerator),
        &mut recovery,
        theme,
    )
}

fn handle_languages(base_dir: &Path, verbose: bool) -> Result<()> {
    let mut settings = Settings::load(base_dir)?;
    let username = resolve_username(&mut settings, base_dir)?;
    let token = ensure_github_token(verbose)?;
    let client = GithubClient::new(&token)?;

    let repos = client.fetch_repositories(&username)?;
    let languages = stats::language_bytes(&repos, |repo| client.fetch_language_breakdown(repo));

    if languages.is_empty() {
        println!(
            "No languages found. Check the GitHub username or repository visibility."
        );
        return Ok(());
    }

    println!();
    println!("Top languages used by {}:", username.cyan().bold());
    println!();
    for (language, bytes) in languages.iter().take(10) {
        println!(
            "  {}: {} bytes",
            language.green(),
            format_thousands(*bytes)
        );
    }
    Ok(())
}

fn handle_plugins(base_dir: &Path) -> Result<()> {
    let settings = Settings::load(base_dir)?;
    let registry = PluginRegistry::with_defaults();

    println!();
    println!("Registered plugins:");
    println!();
    for (name, placement) in registry.plugins() {
        let placement = match placement {
            Placement::Section => "section",
            Placement::Appendix => "appendix",
        };
        let state = if settings.plugin_enabled(name) {
            "enabled".green()
        } else {
            "disabled".red()
        };
        println!("  {} [{}] {}", name.cyan().bold(), placement, state);
    }
    Ok(())
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = Settings::init(base_dir)?;
            println!("{} {}", "Config:".green(), path.display());
        }
        ConfigAction::Show => {
            let settings = Settings::load(base_dir)?;
            println!();
            println!("Current gitfolio config:");
            println!();
            for (key, value) in settings.list() {
                println!("  {}: {}", key.yellow(), value);
            }
        }
        ConfigAction::Reset { force } => {
            if !force && !confirm("Reset gitfolio config to defaults?")? {
                println!("Aborted.");
                return Ok(());
            }
            Settings::default().save(base_dir)?;
            println!("{}", "Config reset to defaults.".green());
        }
        ConfigAction::Get { key } => {
            let settings = Settings::load(base_dir)?;
            let value = settings
                .get(&key)
                .ok_or(GitfolioError::ConfigKeyNotFound { key })?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load(base_dir)?;
            settings.set(&key, &value)?;
            settings.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
    }
    Ok(())
}

fn handle_plugin(action: PluginAction, base_dir: &Path) -> Result<()> {
    let (name, enabled) = match action {
        PluginAction::Enable { name } => (name, true),
        PluginAction::Disable { name } => (name, false),
    };

    let registry = PluginRegistry::with_defaults();
    if !registry.plugins().iter().any(|(n, _)| *n == name) {
        println!(
            "{} no registered plugin named '{}'",
            "[WARN]".yellow().bold(),
            name
        );
    }

    let mut settings = Settings::load(base_dir)?;
    settings.plugins.insert(name.clone(), enabled);
    settings.save(base_dir)?;

    if enabled {
        println!("{} {}", "Enabled plugin:".green(), name);
    } else {
        println!("{} {}", "Disabled plugin:".red(), name);
    }
    Ok(())
}

fn handle_theme(action: ThemeAction, base_dir: &Path) -> Result<()> {
    let templates = TemplateStore::new(Settings::templates_dir(base_dir));

    match action {
        ThemeAction::List => {
            let settings = Settings::load(base_dir)?;
            println!();
            println!("Available templates:");
            println!();
            for name in templates.list() {
                if name == settings.template {
                    println!("  {} {}", name.cyan().bold(), "(active)".green());
                } else {
                    println!("  {}", name);
                }
            }
        }
        ThemeAction::Switch { name } => {
            if !templates.list().contains(&name) {
                return Err(GitfolioError::Template {
                    name,
                    message: "not found".to_string(),
                });
            }
            let mut settings = Settings::load(base_dir)?;
            settings.template = name.clone();
            settings.save(base_dir)?;
            println!("{} {}", "Theme switched to:".green(), name);
        }
    }
    Ok(())
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "gitfolio", &mut io::stdout());
}

// ========== Credentials ==========

/// GitHub username from config, prompting (and persisting) when unset.
fn resolve_username(settings: &mut Settings, base_dir: &Path) -> Result<String> {
    if let Some(username) = settings.github_username.clone() {
        return Ok(username);
    }

    let username = prompt_line("Enter your GitHub username: ")?;
    if username.is_empty() {
        return Err(GitfolioError::Auth {
            credential: "github_username".to_string(),
            message: "a username is required".to_string(),
        });
    }
    settings.github_username = Some(username.clone());
    settings.save(base_dir)?;
    Ok(username)
}

/// GITHUB_TOKEN from the environment, interactively re-prompted and live
/// validated; a rejected token is prompted for once more before giving up.
fn ensure_github_token(verbose: bool) -> Result<String> {
    let mut token = std::env::var("GITHUB_TOKEN").unwrap_or_default();
    let mut prompted = false;

    if is_placeholder_credential(&token) {
        println!(
            "{} GITHUB_TOKEN not found or invalid in .env",
            "[WARN]".yellow().bold()
        );
        token = prompt_token()?;
        prompted = true;
    }

    for attempt in 0..2 {
        let client = GithubClient::new(&token)?;
        match client.validate_token() {
            Ok(login) => {
                if verbose {
                    println!("Token is valid for: {}", login.green());
                }
                if prompted {
                    offer_token_save(&token)?;
                }
                return Ok(token);
            }
            Err(GitfolioError::RemoteApi { status: 401, .. }) if attempt == 0 => {
                println!(
                    "{} token was rejected by GitHub",
                    "[WARN]".yellow().bold()
                );
                token = prompt_token()?;
                prompted = true;
            }
            Err(GitfolioError::RemoteApi { status: 401, message }) => {
                return Err(GitfolioError::Auth {
                    credential: "GITHUB_TOKEN".to_string(),
                    message,
                });
            }
            Err(e) => return Err(e),
        }
    }

    unreachable!("token validation loop always returns")
}

fn prompt_token() -> Result<String> {
    let token = prompt_line("Enter your GitHub token: ")?;
    // tolerate pasted quotes
    Ok(token.replace(['"', '\''], "").trim().to_string())
}

fn offer_token_save(token: &str) -> Result<()> {
    if confirm("Save this token to .env for future use?")? {
        write_env_var(Path::new(ENV_PATH), "GITHUB_TOKEN", token)?;
        println!("{} saved GITHUB_TOKEN to .env", "Done:".green());
    }
    Ok(())
}

/// AI backend when enabled; a client build failure degrades to no backend
/// (the resolver then uses the fallback bio).
fn build_ai_generator(settings: &Settings) -> Option<OpenAiGenerator> {
    if !settings.use_ai {
        return None;
    }
    let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
    match OpenAiGenerator::new(&api_key) {
        Ok(generator) => Some(generator),
        Err(e) => {
            eprintln!("{} {}", "[WARN]".yellow().bold(), e);
            None
        }
    }
}

/// Interactive recovery for bio-generation failures.
struct StdinRecovery;

impl RecoveryPrompt for StdinRecovery {
    fn choose(&mut self, error: &GitfolioError, has_cached: bool) -> RecoveryChoice {
        eprintln!("{} {}", "[WARN]".yellow().bold(), error);
        println!();
        println!("What would you like to do?");
        println!("  1. Re-enter OpenAI API key and retry");
        if has_cached {
            println!("  2. Use cached About Me");
        } else {
            println!("  2. Use cached About Me (none available)");
        }
        println!("  3. Use fallback About Me");
        println!("  4. Skip About Me");

        let choice = prompt_line("Choice [3]: ").unwrap_or_default();
        match choice.as_str() {
            "1" => match prompt_line("Enter your OpenAI API key: ") {
                Ok(key) if !key.is_empty() => RecoveryChoice::RetryWithNewKey(key),
                _ => RecoveryChoice::UseFallback,
            },
            "2" => RecoveryChoice::UseCached,
            "4" => RecoveryChoice::Skip,
            _ => RecoveryChoice::UseFallback,
        }
    }
}

// ========== Prompt/IO helpers ==========

fn prompt_line(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(message: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [y/N]: ", message))?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

/// Update or append `KEY=value` in an env file, preserving other lines.
fn write_env_var(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut lines: Vec<String> = if path.exists() {
        fs::read_to_string(path)?
            .lines()
            .map(|l| l.to_string())
            .collect()
    } else {
        Vec::new()
    };

    let entry = format!("{}={}", key, value);
    let prefix = format!("{}=", key);
    match lines.iter_mut().find(|l| l.trim_start().starts_with(&prefix)) {
        Some(line) => *line = entry,
        None => lines.push(entry),
    }

    fs::write(path, lines.join("\n") + "\n")?;
    Ok(())
}

fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_env_var_creates_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");

        write_env_var(&path, "GITHUB_TOKEN", "ghp_abc").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "GITHUB_TOKEN=ghp_abc\n"
        );
    }

    #[test]
    fn test_write_env_var_replaces_existing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        fs::write(&path, "OPENAI_API_KEY=sk-old\nGITHUB_TOKEN=ghp_old\n").unwrap();

        write_env_var(&path, "GITHUB_TOKEN", "ghp_new").unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("OPENAI_API_KEY=sk-old"));
        assert!(content.contains("GITHUB_TOKEN=ghp_new"));
        assert!(!content.contains("ghp_old"));
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
