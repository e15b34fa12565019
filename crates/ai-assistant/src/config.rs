use anyhow::{bail, Context, Result};
use etcetera::{choose_app_strategy, AppStrategy, AppStrategyArgs};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub static APP_STRATEGY: Lazy<AppStrategyArgs> = Lazy::new(|| AppStrategyArgs {
    top_level_domain: "com".to_string(),
    author: "claude-mcp".to_string(),
    app_name: "ai-assistant".to_string(),
});

/// Overrides the config file location when set.
pub const CONFIG_PATH_ENV: &str = "AI_ASSISTANT_CONFIG";

/// One configured backend model, keyed in [`Config::models`] by the
/// caller-facing alias.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    /// Identifier sent to the backend API, e.g. "google/gemini-2.5-pro".
    pub model_id: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Parsed for forward compatibility; no tool takes image input yet.
    #[serde(default)]
    pub supports_images: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of the environment variable holding the backend API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Alias used when a call omits `model`. Must name an entry in `models`.
    #[serde(default = "default_model")]
    pub default_model: String,
    pub models: BTreeMap<String, ModelEntry>,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_model() -> String {
    "Gemini".to_string()
}

impl Config {
    /// Loads the config from `$AI_ASSISTANT_CONFIG` if set, otherwise from
    /// `config.json` under the platform config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            bail!("Config must define at least one model");
        }
        if !self.models.contains_key(&self.default_model) {
            bail!(
                "Default model '{}' is not defined in models ({})",
                self.default_model,
                self.model_list()
            );
        }
        Ok(())
    }

    /// Looks up a model by alias. `None` means the caller asked for a model
    /// that is not configured; the dispatcher reports it as a validation
    /// failure, not a backend one.
    pub fn resolve(&self, alias: &str) -> Option<&ModelEntry> {
        self.models.get(alias)
    }

    /// Configured aliases in sorted order (BTreeMap iteration order), used
    /// for the tool catalog and error messages.
    pub fn aliases(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn model_list(&self) -> String {
        self.aliases().join(", ")
    }

    /// Resolves the backend API key from the configured environment variable.
    /// Missing key is fatal at startup; the server never starts without one.
    pub fn api_key(&self) -> Result<String> {
        env::var(&self.api_key_env).with_context(|| {
            format!(
                "Environment variable {} is not set (expected the OpenRouter API key)",
                self.api_key_env
            )
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    let strategy = choose_app_strategy(APP_STRATEGY.clone())
        .context("Could not determine user config directory")?;
    Ok(strategy.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        file.write_all(json.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_full_config_parses() {
        let file = write_config(
            r#"{
                "api_key_env": "MY_KEY",
                "default_model": "Gemini",
                "models": {
                    "Gemini": {"model_id": "google/gemini-2.5-pro", "max_tokens": 8192, "supports_images": true},
                    "DeepSeek": {"model_id": "deepseek/deepseek-chat"}
                }
            }"#,
        );

        let config = Config::load_from(file.path()).expect("config should parse");
        assert_eq!(config.api_key_env, "MY_KEY");
        assert_eq!(config.default_model, "Gemini");
        assert_eq!(config.models.len(), 2);

        let gemini = config.resolve("Gemini").expect("Gemini is configured");
        assert_eq!(gemini.model_id, "google/gemini-2.5-pro");
        assert_eq!(gemini.max_tokens, 8192);
        assert!(gemini.supports_images);

        let deepseek = config.resolve("DeepSeek").expect("DeepSeek is configured");
        assert_eq!(deepseek.max_tokens, 4096);
        assert!(!deepseek.supports_images);
    }

    #[test]
    fn test_defaults_applied_when_fields_absent() {
        let file = write_config(r#"{"models": {"Gemini": {"model_id": "g-1"}}}"#);

        let config = Config::load_from(file.path()).expect("config should parse");
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.default_model, "Gemini");
    }

    #[test]
    fn test_aliases_are_sorted() {
        let file = write_config(
            r#"{
                "default_model": "Claude",
                "models": {
                    "Gemini": {"model_id": "g-1"},
                    "Claude": {"model_id": "c-1"},
                    "DeepSeek": {"model_id": "d-1"}
                }
            }"#,
        );

        let config = Config::load_from(file.path()).expect("config should parse");
        assert_eq!(config.aliases(), vec!["Claude", "DeepSeek", "Gemini"]);
        assert_eq!(config.model_list(), "Claude, DeepSeek, Gemini");
    }

    #[test]
    fn test_empty_models_rejected() {
        let file = write_config(r#"{"default_model": "Gemini", "models": {}}"#);

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("at least one model"));
    }

    #[test]
    fn test_default_model_must_be_configured() {
        let file = write_config(
            r#"{"default_model": "Missing", "models": {"Gemini": {"model_id": "g-1"}}}"#,
        );

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("'Missing'"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let file = write_config("{not json");

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = Config::load_from(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn test_config_path_env_override() {
        let _guard = env_lock::lock_env([(CONFIG_PATH_ENV, Some("/tmp/custom.json"))]);
        assert_eq!(config_path().unwrap(), PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_api_key_read_from_configured_var() {
        let _guard = env_lock::lock_env([("TEST_ASSISTANT_KEY", Some("sk-123"))]);
        let file = write_config(
            r#"{"api_key_env": "TEST_ASSISTANT_KEY", "default_model": "Gemini", "models": {"Gemini": {"model_id": "g-1"}}}"#,
        );

        let config = Config::load_from(file.path()).expect("config should parse");
        assert_eq!(config.api_key().unwrap(), "sk-123");
    }

    #[test]
    fn test_missing_api_key_names_the_variable() {
        let _guard = env_lock::lock_env([("TEST_ASSISTANT_ABSENT", None::<&str>)]);
        let file = write_config(
            r#"{"api_key_env": "TEST_ASSISTANT_ABSENT", "default_model": "Gemini", "models": {"Gemini": {"model_id": "g-1"}}}"#,
        );

        let config = Config::load_from(file.path()).expect("config should parse");
        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("TEST_ASSISTANT_ABSENT"));
    }
}
