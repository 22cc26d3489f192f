//! One handler per configuration key.

use super::error::SettingError;
use super::helpers::{format_bool, parse_bool};
use super::SettingHandler;
use crate::core::config::data::{Config, DEFAULT_BASE_URL};
use crate::core::http::DEFAULT_REQUEST_TIMEOUT;
use crate::utils::url::{is_http_url, normalize_base_url};

pub struct BaseUrlHandler;

impl SettingHandler for BaseUrlHandler {
    fn key(&self) -> &'static str {
        "base-url"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "Specify the backend base URL",
                example: "ragchat set base-url http://localhost:8000",
            });
        }
        if !is_http_url(&input) {
            return Err(SettingError::InvalidUrl(input));
        }
        let url = normalize_base_url(&input);
        config.base_url = Some(url.clone());
        Ok(format!("✅ Set base-url to: {url}"))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.base_url = None;
        format!("✅ Unset base-url (will use default: {DEFAULT_BASE_URL})")
    }
}

pub struct WebSearchHandler;

impl SettingHandler for WebSearchHandler {
    fn key(&self) -> &'static str {
        "web-search"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "Specify on or off",
                example: "ragchat set web-search off",
            });
        }
        let input = args.join(" ");
        let value = parse_bool(&input).ok_or(SettingError::InvalidBoolean(input))?;
        config.web_search = Some(value);
        Ok(format!("✅ Set web-search to: {}", format_bool(value)))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.web_search = None;
        "✅ Unset web-search (will use default: on)".to_string()
    }
}

pub struct TimeoutHandler;

impl SettingHandler for TimeoutHandler {
    fn key(&self) -> &'static str {
        "timeout"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "Specify the request timeout in seconds",
                example: "ragchat set timeout 60",
            });
        }
        let secs = input
            .trim()
            .trim_end_matches('s')
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| SettingError::InvalidTimeout(input.clone()))?;
        config.request_timeout_secs = Some(secs);
        Ok(format!("✅ Set timeout to: {secs}s"))
    }

    fn unset(&self, config: &mut Config) -> String {
        config.request_timeout_secs = None;
        format!(
            "✅ Unset timeout (will use default: {}s)",
            DEFAULT_REQUEST_TIMEOUT.as_secs()
        )
    }
}
