use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::http::DEFAULT_REQUEST_TIMEOUT;
use crate::utils::url::normalize_base_url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const BASE_URL_ENV: &str = "RAGCHAT_BASE_URL";
/// Fallback variable, shared with the web frontend deployment.
pub const LEGACY_BASE_URL_ENV: &str = "FASTAPI_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Backend service root, e.g. `http://localhost:8000`
    pub base_url: Option<String>,
    /// Let the agent fall back to web search when the knowledge base is
    /// insufficient
    pub web_search: Option<bool>,
    /// Upper bound on a single backend request, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Settings after applying flags, environment and the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSettings {
    pub base_url: String,
    pub web_search: bool,
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve effective settings once at startup.
    ///
    /// Base URL precedence: `cli_base_url`, then `RAGCHAT_BASE_URL`, then
    /// `FASTAPI_BASE_URL`, then the config file, then [`DEFAULT_BASE_URL`].
    /// Blank values are skipped.
    pub fn resolve<F>(&self, cli_base_url: Option<&str>, env: F) -> ResolvedSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |value: String| (!value.trim().is_empty()).then_some(value);
        let base_url = cli_base_url
            .map(str::to_string)
            .and_then(non_blank)
            .or_else(|| env(BASE_URL_ENV).and_then(non_blank))
            .or_else(|| env(LEGACY_BASE_URL_ENV).and_then(non_blank))
            .or_else(|| self.base_url.clone().and_then(non_blank))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        ResolvedSettings {
            base_url: normalize_base_url(&base_url),
            web_search: self.web_search.unwrap_or(true),
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// [`Config::resolve`] against the real process environment.
    pub fn resolve_from_env(&self, cli_base_url: Option<&str>) -> ResolvedSettings {
        self.resolve(cli_base_url, |key| std::env::var(key).ok())
    }
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
