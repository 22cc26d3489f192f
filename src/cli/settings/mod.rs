//! Settings management for CLI set/unset commands.

pub mod error;
pub mod handlers;
pub mod helpers;

use std::collections::HashMap;
use std::path::Path;

pub use error::SettingError;

use crate::core::config::data::Config;
use handlers::{BaseUrlHandler, TimeoutHandler, WebSearchHandler};

/// Trait for handling a configuration setting.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Set the value from the arguments given after the key.
    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError>;

    /// Clear the value so the default applies again.
    fn unset(&self, config: &mut Config) -> String;
}

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
        };
        registry.register(Box::new(BaseUrlHandler));
        registry.register(Box::new(WebSearchHandler));
        registry.register(Box::new(TimeoutHandler));
        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        self.handlers.insert(handler.key(), handler);
    }

    pub fn get(&self, key: &str) -> Result<&dyn SettingHandler, SettingError> {
        self.handlers
            .get(key)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| SettingError::UnknownKey(key.to_string()))
    }

    /// Apply `set` to the config file at `config_path`.
    pub fn set_at(
        &self,
        config_path: &Path,
        key: &str,
        args: &[String],
    ) -> Result<String, SettingError> {
        let handler = self.get(key)?;
        let mut config = load(config_path)?;
        let message = handler.set(args, &mut config)?;
        save(&config, config_path)?;
        Ok(message)
    }

    /// Apply `unset` to the config file at `config_path`.
    pub fn unset_at(&self, config_path: &Path, key: &str) -> Result<String, SettingError> {
        let handler = self.get(key)?;
        let mut config = load(config_path)?;
        let message = handler.unset(&mut config);
        save(&config, config_path)?;
        Ok(message)
    }
}

fn load(config_path: &Path) -> Result<Config, SettingError> {
    Config::load_from_path(config_path).map_err(|err| SettingError::ConfigError(err.to_string()))
}

fn save(config: &Config, config_path: &Path) -> Result<(), SettingError> {
    config
        .save_to_path(config_path)
        .map_err(|err| SettingError::ConfigError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn set_and_unset_round_trip_through_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let registry = SettingRegistry::new();

        let message = registry
            .set_at(&path, "base-url", &args(&["http://agent:8080/"]))
            .expect("set base-url");
        assert_eq!(message, "✅ Set base-url to: http://agent:8080");
        registry
            .set_at(&path, "web-search", &args(&["off"]))
            .expect("set web-search");
        registry
            .set_at(&path, "timeout", &args(&["45s"]))
            .expect("set timeout");

        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.base_url.as_deref(), Some("http://agent:8080"));
        assert_eq!(config.web_search, Some(false));
        assert_eq!(config.request_timeout_secs, Some(45));

        registry.unset_at(&path, "base-url").expect("unset");
        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.base_url, None);
        assert_eq!(config.web_search, Some(false));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.toml");
        let registry = SettingRegistry::new();

        assert!(matches!(
            registry.set_at(&path, "base-url", &args(&["localhost:8000"])),
            Err(SettingError::InvalidUrl(_))
        ));
        assert!(matches!(
            registry.set_at(&path, "web-search", &args(&["maybe"])),
            Err(SettingError::InvalidBoolean(_))
        ));
        assert!(matches!(
            registry.set_at(&path, "timeout", &args(&["0"])),
            Err(SettingError::InvalidTimeout(_))
        ));
        assert!(matches!(
            registry.set_at(&path, "web-search", &[]),
            Err(SettingError::MissingArgs { .. })
        ));
        assert!(matches!(
            registry.unset_at(&path, "theme"),
            Err(SettingError::UnknownKey(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for input in ["on", "TRUE", "yes", "1"] {
            assert_eq!(helpers::parse_bool(input), Some(true), "{input}");
        }
        for input in ["off", "False", "no", "0"] {
            assert_eq!(helpers::parse_bool(input), Some(false), "{input}");
        }
        assert_eq!(helpers::parse_bool("sometimes"), None);
    }
}
