//! Generator configuration.
//!
//! Loaded once at startup and passed by value into the application. Nothing
//! reads configuration from ambient global state after that.

use std::path::{Path, PathBuf};

use crate::infrastructure::openai::{
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL, DEFAULT_TIMEOUT_SECS,
};
use npcsmith_domain::DEFAULT_MAX_TOKENS;

pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_TOP_P: f32 = 1.0;
pub const DEFAULT_RULE_SYSTEM: &str = "dnd5e";

/// Configuration is fatal to the whole request when invalid; nothing is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
    #[error("No model configured")]
    MissingModel,
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            key,
            message: message.to_string(),
        }
    }
}

/// Everything the generator needs to run.
#[derive(Clone, PartialEq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub fivetools_path: Option<PathBuf>,
    pub rule_system: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("fivetools_path", &self.fivetools_path)
            .field("rule_system", &self.rule_system)
            .finish()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: DEFAULT_MAX_TOKENS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            fivetools_path: None,
            rule_system: DEFAULT_RULE_SYSTEM.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset keys take their defaults. Unparsable numbers are reported
    /// rather than silently replaced.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let max_tokens = match get("NPC_MAX_TOKENS") {
            Some(raw) => {
                let parsed: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid("NPC_MAX_TOKENS", &raw))?;
                normalize_max_tokens(Some(parsed))
            }
            None => defaults.max_tokens,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY").unwrap_or_default(),
            base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: get("NPC_MODEL").unwrap_or(defaults.model),
            temperature: parse_or("NPC_TEMPERATURE", get("NPC_TEMPERATURE"), defaults.temperature)?,
            top_p: parse_or("NPC_TOP_P", get("NPC_TOP_P"), defaults.top_p)?,
            max_tokens,
            request_timeout_secs: parse_or(
                "NPC_REQUEST_TIMEOUT_SECS",
                get("NPC_REQUEST_TIMEOUT_SECS"),
                defaults.request_timeout_secs,
            )?,
            fivetools_path: get("FIVETOOLS_DATA_PATH").map(PathBuf::from),
            rule_system: get("NPC_RULE_SYSTEM").unwrap_or(defaults.rule_system),
        })
    }

    /// Check that a request can be sent with this configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel);
        }
        validate_sampling(self.temperature, self.top_p)
    }
}

/// Temperature must lie in 0..=2 and top_p in 0..=1.
pub fn validate_sampling(temperature: f32, top_p: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::invalid(
            "temperature",
            format!("{} is outside 0..=2", temperature),
        ));
    }
    if !(0.0..=1.0).contains(&top_p) {
        return Err(ConfigError::invalid(
            "top_p",
            format!("{} is outside 0..=1", top_p),
        ));
    }
    Ok(())
}

/// Non-positive or absent token limits fall back to the default.
pub fn normalize_max_tokens(raw: Option<i64>) -> u32 {
    raw.filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_MAX_TOKENS)
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw.parse().map_err(|_| ConfigError::invalid(key, raw)),
        None => Ok(default),
    }
}

/// Load `.env.local` then `.env`, searching upward from the working directory.
///
/// Variables already set in the environment win. Missing files are ignored.
pub fn load_dotenv_from_repo_root() {
    let Ok(cwd) = std::env::current_dir() else {
        return;
    };

    let Some(root) = find_repo_root(&cwd) else {
        let _ = dotenvy::dotenv();
        return;
    };

    for name in [".env.local", ".env"] {
        let path = root.join(name);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Loaded environment file"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to load environment file"),
            }
        }
    }
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists() || dir.join("Cargo.lock").exists())
        .map(Path::to_path_buf)
}
