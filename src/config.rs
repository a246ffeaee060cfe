use crate::log_debug;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder written into the `.env` template; treated as "no key"
pub const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

/// Default Gemini model for fast responses
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Base URL of the Gemini REST API
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE_NAME: &str = "courseweaver";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Environment file read at startup and written by `courseweaver setup`
pub const ENV_FILE: &str = ".env";

const ENV_TEMPLATE: &str = "# CourseWeaver Environment Variables

# Google Gemini API Key (Required)
# Get your API key from: https://makersuite.google.com/app/apikey
GEMINI_API_KEY=your_gemini_api_key_here

# Database Configuration (Optional - defaults to local MongoDB)
MONGODB_URI=mongodb://localhost:27017
DATABASE_NAME=courseweaver

# Server Configuration (Optional)
HOST=0.0.0.0
PORT=8000
DEBUG=True
";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not configured; edit .env and add your Gemini API key")]
    MissingApiKey,
    #[error("{} file not found; run `courseweaver setup` to create one", .0.display())]
    MissingEnvFile(PathBuf),
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What `write_env_template` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Created,
    AlreadyExists,
}

/// Runtime configuration for the CourseWeaver service
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the Gemini model; generation fails with a structured error without it
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Overridable so tests can point the client at a mock server
    pub gemini_api_base: String,
    pub mongodb_uri: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
    /// Directory uploaded syllabi are written to and served from
    pub upload_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            mongodb_uri: DEFAULT_MONGODB_URI.to_string(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: true,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unset, empty or unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let default = Self::default();

        let config = Self {
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(default.gemini_model),
            gemini_api_base: get("GEMINI_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(default.gemini_api_base),
            mongodb_uri: get("MONGODB_URI").unwrap_or(default.mongodb_uri),
            database_name: get("DATABASE_NAME").unwrap_or(default.database_name),
            host: get("HOST").unwrap_or(default.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(default.port),
            debug: get("DEBUG")
                .and_then(|d| parse_flag(&d))
                .unwrap_or(default.debug),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),
        };

        log_debug!(
            "Configuration loaded: model={}, database={}, bind={}:{}, api_key_set={}",
            config.gemini_model,
            config.database_name,
            config.host,
            config.port,
            config.gemini_api_key.is_some()
        );
        config
    }

    /// The configured API key, rejecting the template placeholder
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        match self.gemini_api_key.as_deref() {
            Some(key) if !key.is_empty() && key != API_KEY_PLACEHOLDER => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Write the `.env` template at `path` unless a file is already there
pub fn write_env_template(path: &Path) -> Result<SetupOutcome, ConfigError> {
    if path.exists() {
        log_debug!("{} already exists, leaving it untouched", path.display());
        return Ok(SetupOutcome::AlreadyExists);
    }

    fs::write(path, ENV_TEMPLATE).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SetupOutcome::Created)
}

/// Check that the environment file exists and the API key is usable
pub fn check_environment(path: &Path, config: &Config) -> Result<(), ConfigError> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::MissingEnvFile(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    config.api_key().map(|_| ())
}
