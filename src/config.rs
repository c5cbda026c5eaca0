use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for the page monitor process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Maximum number of pages fetched at the same time; the WebDriver
    /// fetcher keeps up to this many browser sessions open
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Seconds between checks for due scans
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,

    /// Seconds before a single fetch is abandoned
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// JSON file holding pages, folders and their last content
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

impl MonitorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            max_concurrency: default_max_concurrency(),
            tick_interval_secs: default_tick_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            store_path: default_store_path(),
        }
    }
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    4
}

fn default_tick_interval_secs() -> u64 {
    30
}

fn default_fetch_timeout_secs() -> u64 {
    45
}

fn default_store_path() -> String {
    "pages.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let config = MonitorConfig::from_json(r#"{"max_concurrency": 8}"#).unwrap();
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.tick_interval_secs, 30);
        assert_eq!(config.store_path, "pages.json");
    }

    #[test]
    fn test_invalid_json() {
        assert!(MonitorConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("update-scan-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"fetch_timeout_secs": 5}"#).unwrap();
        let config = MonitorConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.fetch_timeout_secs, 5);
    }
}
