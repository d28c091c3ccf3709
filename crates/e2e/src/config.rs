//! Suite configuration

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4100";

/// Target deployment of the app under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Staging,
}

/// Per-environment defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentProfile {
    pub base_url: &'static str,
    pub timeout: Duration,
    pub headless: bool,
}

impl Environment {
    pub fn profile(&self) -> EnvironmentProfile {
        match self {
            Environment::Local => EnvironmentProfile {
                base_url: DEFAULT_BASE_URL,
                timeout: Duration::from_secs(10),
                headless: false,
            },
            Environment::Dev => EnvironmentProfile {
                base_url: "https://dev.example.com",
                timeout: Duration::from_secs(15),
                headless: true,
            },
            Environment::Staging => EnvironmentProfile {
                base_url: "https://staging.example.com",
                timeout: Duration::from_secs(20),
                headless: true,
            },
        }
    }
}

/// Everything a scenario needs to know about where and how to drive the app
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Root URL of the RealWorld frontend
    pub base_url: String,

    /// Routes live after `#/` (HashRouter builds of the frontend)
    pub hash_routing: bool,

    /// Default explicit wait for page loads and navigation
    pub timeout: Duration,

    /// Shorter wait for element visibility checks
    pub wait: Duration,

    /// Polling interval for explicit waits
    pub poll_interval: Duration,

    /// Attempts for retried interactions
    pub retry_count: u32,

    /// Where failure screenshots go
    pub screenshot_dir: PathBuf,

    /// Capture a screenshot when a scenario fails
    pub screenshot_on_failure: bool,

    /// Directory holding `test_data.json`
    pub data_dir: PathBuf,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hash_routing: true,
            timeout: Duration::from_secs(10),
            wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            retry_count: 3,
            screenshot_dir: PathBuf::from("reports/screenshots"),
            screenshot_on_failure: true,
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
        }
    }
}

impl SuiteConfig {
    /// Defaults for a given environment profile
    pub fn for_environment(env: Environment) -> Self {
        let profile = env.profile();
        Self {
            base_url: profile.base_url.to_string(),
            timeout: profile.timeout,
            ..Default::default()
        }
    }

    /// Absolute URL of an app route such as `login` or `@alice`
    pub fn url_for(&self, route: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let route = route.trim_start_matches('/').trim_start_matches("#/");
        if self.hash_routing {
            format!("{}/#/{}", base, route)
        } else {
            format!("{}/{}", base, route)
        }
    }

    /// URL of the home page
    pub fn home_url(&self) -> String {
        self.url_for("")
    }

    pub fn test_data_path(&self) -> PathBuf {
        self.data_dir.join("test_data.json")
    }

    /// Create the output directories the run writes into
    pub fn ensure_dirs(&self) -> E2eResult<()> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "http://localhost:4100");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.wait, Duration::from_secs(5));
        assert_eq!(config.retry_count, 3);
        assert!(config.test_data_path().ends_with("data/test_data.json"));
    }

    #[test]
    fn test_url_for_hash_routing() {
        let config = SuiteConfig::default();
        assert_eq!(config.url_for("login"), "http://localhost:4100/#/login");
        assert_eq!(config.url_for("/settings"), "http://localhost:4100/#/settings");
        assert_eq!(config.url_for("#/@alice"), "http://localhost:4100/#/@alice");
        assert_eq!(config.home_url(), "http://localhost:4100/#/");
    }

    #[test]
    fn test_url_for_path_routing() {
        let config = SuiteConfig {
            base_url: "https://conduit.test/".into(),
            hash_routing: false,
            ..Default::default()
        };
        assert_eq!(config.url_for("editor"), "https://conduit.test/editor");
    }

    #[test]
    fn test_environment_profiles() {
        let staging = SuiteConfig::for_environment(Environment::Staging);
        assert_eq!(staging.base_url, "https://staging.example.com");
        assert_eq!(staging.timeout, Duration::from_secs(20));
        assert!(Environment::Dev.profile().headless);
        assert!(!Environment::Local.profile().headless);
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let config = SuiteConfig {
            screenshot_dir: tmp.path().join("reports/screenshots"),
            ..Default::default()
        };
        config.ensure_dirs().unwrap();
        assert!(config.screenshot_dir.is_dir());
    }
}
