//! Runtime configuration
//!
//! Read once from the environment at startup.

use std::path::PathBuf;

use thiserror::Error;

use crate::nutrition::Separator;

pub const DATABASE_PATH_VAR: &str = "SNA_DATABASE_PATH";
pub const NEIS_API_KEY_VAR: &str = "SNA_NEIS_API_KEY";
pub const SEPARATORS_VAR: &str = "SNA_NUTRITION_SEPARATORS";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown nutrition separator '{0}' (expected br, newline or pipe)")]
    UnknownSeparator(String),

    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub neis_api_key: Option<String>,
    pub separators: Vec<Separator>,
}

impl Config {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let neis_api_key = lookup(NEIS_API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let separators = match lookup(SEPARATORS_VAR) {
            Some(raw) => parse_separators(&raw)?,
            None => Separator::ALL.to_vec(),
        };

        Ok(Self {
            database_path,
            neis_api_key,
            separators,
        })
    }

    /// The directory API key, or a configuration error naming the variable
    pub fn require_neis_api_key(&self) -> Result<&str, ConfigError> {
        self.neis_api_key
            .as_deref()
            .ok_or(ConfigError::Missing(NEIS_API_KEY_VAR))
    }
}

/// Parse a comma list such as `br,pipe`; an empty list means all separators
pub fn parse_separators(raw: &str) -> Result<Vec<Separator>, ConfigError> {
    let mut separators = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let sep = Separator::from_str(token)
            .ok_or_else(|| ConfigError::UnknownSeparator(token.to_string()))?;
        if !separators.contains(&sep) {
            separators.push(sep);
        }
    }

    if separators.is_empty() {
        return Ok(Separator::ALL.to_vec());
    }
    Ok(separators)
}

/// `<project>/data/sna.db`, where the project root is found by walking up
/// from `target/release` or `target/debug`
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("sna.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.database_path.ends_with("data/sna.db"));
        assert!(config.neis_api_key.is_none());
        assert_eq!(config.separators, Separator::ALL.to_vec());
        assert!(matches!(
            config.require_neis_api_key(),
            Err(ConfigError::Missing(NEIS_API_KEY_VAR))
        ));
    }

    #[test]
    fn test_explicit_values() {
        let config = config_from(&[
            (DATABASE_PATH_VAR, "/tmp/meals.db"),
            (NEIS_API_KEY_VAR, " abc123 "),
            (SEPARATORS_VAR, "pipe, br"),
        ])
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/meals.db"));
        assert_eq!(config.require_neis_api_key().unwrap(), "abc123");
        assert_eq!(config.separators, vec![Separator::Pipe, Separator::LineBreak]);
    }

    #[test]
    fn test_parse_separators() {
        assert_eq!(parse_separators("").unwrap(), Separator::ALL.to_vec());
        assert_eq!(parse_separators("newline,newline").unwrap(), vec![Separator::Newline]);
        assert!(matches!(
            parse_separators("br,tab"),
            Err(ConfigError::UnknownSeparator(t)) if t == "tab"
        ));
    }
}
