use crate::core::config::data::{Config, DEFAULT_BASE_URL};
use crate::core::http::DEFAULT_REQUEST_TIMEOUT;

impl Config {
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec!["Current configuration:".to_string()];
        lines.push(match &self.base_url {
            Some(url) => format!("  base-url: {url}"),
            None => format!("  base-url: (unset, default {DEFAULT_BASE_URL})"),
        });
        lines.push(match self.web_search.unwrap_or(true) {
            true => "  web-search: on".to_string(),
            false => "  web-search: off".to_string(),
        });
        lines.push(match self.request_timeout_secs {
            Some(secs) => format!("  timeout: {secs}s"),
            None => format!(
                "  timeout: (unset, default {}s)",
                DEFAULT_REQUEST_TIMEOUT.as_secs()
            ),
        });
        lines
    }

    pub fn print_all(&self) {
        for line in self.describe() {
            println!("{line}");
        }
    }
}
