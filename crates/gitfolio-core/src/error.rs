use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitfolioError {
    #[error("GitHub API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Missing or invalid credential {credential}: {message}")]
    Auth { credential: String, message: String },

    #[error("Bio generation failed: {message}")]
    Generation { message: String },

    #[error("Template '{name}': {message}")]
    Template { name: String, message: String },

    #[error("Plugin '{name}' failed: {message}")]
    Plugin { name: String, message: String },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found")]
    HomeNotFound,
}

pub type Result<T> = std::result::Result<T, GitfolioError>;

impl GitfolioError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RemoteApi { .. } | Self::Http(_) => 2,
            Self::Auth { .. } => 3,
            Self::Template { .. } => 4,
            Self::ConfigParse { .. } | Self::ConfigKeyNotFound { .. } => 5,
            _ => 1,
        }
    }
}
