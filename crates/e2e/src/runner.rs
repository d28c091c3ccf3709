//! Test runner that owns the driver process and browser session and runs
//! scenarios one after another

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::TestData;
use crate::pages::BasePage;
use crate::scenario::{Marker, Scenario, ScenarioContext, ScenarioFilter, Suite};
use crate::webdriver::{Browser, Capabilities, DriverService, ServiceConfig, WebDriverClient};

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub name: String,
    pub suite: Suite,
    pub marker: Marker,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot: Option<String>,
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Deselected by the filter
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios against one browser session
pub struct TestRunner {
    /// Suite configuration shared with every scenario
    suite: Arc<SuiteConfig>,

    /// Session capabilities
    capabilities: Capabilities,

    /// Driver process configuration
    service_config: ServiceConfig,

    /// Already running WebDriver server; skips spawning a driver
    webdriver_url: Option<String>,

    /// Which scenarios to run
    filter: ScenarioFilter,

    /// Output directory for results
    output_dir: PathBuf,

    /// Spawned driver process (if any)
    service: Option<DriverService>,

    /// Open session (if any)
    browser: Option<Arc<dyn Browser>>,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            suite: Arc::new(config.suite),
            capabilities: config.capabilities,
            service_config: config.service,
            webdriver_url: config.webdriver_url,
            filter: config.filter,
            output_dir: config.output_dir,
            service: None,
            browser: None,
        }
    }

    /// Use an existing browser session instead of starting one
    pub fn with_browser(config: RunnerConfig, browser: Arc<dyn Browser>) -> Self {
        let mut runner = Self::with_config(config);
        runner.browser = Some(browser);
        runner
    }

    pub fn suite_config(&self) -> &SuiteConfig {
        &self.suite
    }

    /// Spawn the driver (unless an external one is configured) and open the session
    pub async fn start(&mut self) -> E2eResult<()> {
        if self.browser.is_some() {
            return Ok(()); // Already running
        }

        let url = match &self.webdriver_url {
            Some(url) => url.clone(),
            None => {
                let service = DriverService::spawn(self.service_config.clone()).await?;
                let url = service.url().to_string();
                self.service = Some(service);
                url
            }
        };

        let client = WebDriverClient::connect(&url, &self.capabilities).await?;
        self.browser = Some(Arc::new(client));
        Ok(())
    }

    /// Quit the session and stop the driver
    pub async fn shutdown(&mut self) -> E2eResult<()> {
        if let Some(browser) = self.browser.take() {
            if let Err(e) = browser.quit().await {
                warn!("Failed to end browser session: {}", e);
            }
        }
        self.stop_service()
    }

    fn stop_service(&mut self) -> E2eResult<()> {
        if let Some(mut service) = self.service.take() {
            service.stop()?;
        }
        Ok(())
    }

    /// Run every scenario the filter selects, in order
    pub async fn run(&mut self, scenarios: &[Scenario], data: Arc<TestData>) -> E2eResult<TestSuiteResult> {
        let started_at = Local::now().to_rfc3339();
        let start = Instant::now();
        let selected: Vec<&Scenario> = scenarios.iter().filter(|s| self.filter.matches(s)).collect();
        let skipped = scenarios.len() - selected.len();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        self.start().await?;
        self.suite.ensure_dirs()?;

        info!("Running {} scenario(s), {} deselected...", selected.len(), skipped);

        for scenario in selected {
            let result = self.run_scenario(scenario, data.clone()).await?;
            if result.success {
                passed += 1;
                info!("✓ {} {} ({} ms)", result.id, result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} {} - {}",
                    result.id,
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        Ok(TestSuiteResult {
            started_at,
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        })
    }

    /// Run one scenario, screenshot it on failure, then reset the browser
    pub async fn run_scenario(&mut self, scenario: &Scenario, data: Arc<TestData>) -> E2eResult<TestResult> {
        self.start().await?;
        let browser = self.session()?;
        let start = Instant::now();
        debug!("Running scenario: {} {}", scenario.id, scenario.name);

        let ctx = ScenarioContext::new(browser.clone(), self.suite.clone(), data);
        let outcome = scenario.run(ctx).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let mut screenshot = None;
        if outcome.is_err() && self.suite.screenshot_on_failure {
            screenshot = save_screenshot(browser.as_ref(), &self.suite.screenshot_dir, &scenario.id)
                .await
                .map(|p| p.display().to_string());
        }

        if let Err(e) = reset_browser(browser.as_ref(), &self.suite).await {
            warn!("Failed to reset browser after {}: {}", scenario.id, e);
        }

        Ok(TestResult {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            suite: scenario.suite,
            marker: scenario.marker,
            success: outcome.is_ok(),
            duration_ms,
            error: outcome.err().map(|e| e.to_string()),
            screenshot,
        })
    }

    fn session(&self) -> E2eResult<Arc<dyn Browser>> {
        self.browser
            .clone()
            .ok_or_else(|| E2eError::DriverStartup("no browser session".to_string()))
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TestRunner {
    fn drop(&mut self) {
        let _ = self.stop_service();
    }
}

/// Back to a single window on the home page with empty localStorage
pub async fn reset_browser(browser: &dyn Browser, config: &SuiteConfig) -> E2eResult<()> {
    let handles = browser.window_handles().await?;
    if let Some((first, rest)) = handles.split_first() {
        for handle in rest {
            browser.switch_to_window(handle).await?;
            browser.close_window().await?;
        }
        browser.switch_to_window(first).await?;
    }

    let page = BasePage::new(browser, config);
    page.open("").await?;
    page.clear_local_storage().await?;
    // Reload so the app drops its in-memory session
    browser.refresh().await
}

/// Save `{dir}/{id}_{YYYYmmdd_HHMMSS}.png`; failures are logged, not returned
pub async fn save_screenshot(browser: &dyn Browser, dir: &Path, id: &str) -> Option<PathBuf> {
    let file_id: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{}_{}.png", file_id, Local::now().format("%Y%m%d_%H%M%S")));

    let png = match browser.screenshot().await {
        Ok(png) => png,
        Err(e) => {
            warn!("Screenshot for {} failed: {}", id, e);
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(dir).and_then(|_| std::fs::write(&path, png)) {
        warn!("Could not write {}: {}", path.display(), e);
        return None;
    }
    info!("Screenshot saved: {}", path.display());
    Some(path)
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub suite: SuiteConfig,
    pub capabilities: Capabilities,
    pub service: ServiceConfig,
    pub webdriver_url: Option<String>,
    pub filter: ScenarioFilter,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            suite: SuiteConfig::default(),
            capabilities: Capabilities::default(),
            service: ServiceConfig::default(),
            webdriver_url: None,
            filter: ScenarioFilter::default(),
            output_dir: PathBuf::from("reports"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check;
    use crate::pages::testing::fast_config;
    use crate::webdriver::fake::FakeBrowser;

    async fn passes(ctx: ScenarioContext) -> E2eResult<()> {
        ctx.base().set_local_storage_item("jwt", "token").await?;
        ctx.browser().new_window().await?;
        Ok(())
    }

    async fn fails(ctx: ScenarioContext) -> E2eResult<()> {
        let url = ctx.base().current_url().await?;
        check!(url.contains("settings"), "not on settings: {}", url);
        Ok(())
    }

    async fn broken_driver(_ctx: ScenarioContext) -> E2eResult<()> {
        Err(E2eError::WebDriver {
            error: "invalid session id".into(),
            message: "gone".into(),
        })
    }

    fn catalogue() -> Vec<Scenario> {
        vec![
            Scenario::new("AUTH-AUTO-001", "passes", Suite::Auth, Marker::DataNotRequired, passes),
            Scenario::new("COM-AUTO-008[0]", "fails", Suite::Comment, Marker::DataRequired, fails),
            Scenario::new("SET-AUTO-001", "driver error", Suite::Settings, Marker::DataNotRequired, broken_driver),
        ]
    }

    fn runner(dir: &Path, filter: ScenarioFilter) -> (TestRunner, Arc<FakeBrowser>) {
        let browser = Arc::new(FakeBrowser::new("http://localhost:4100/#/"));
        let config = RunnerConfig {
            suite: SuiteConfig {
                screenshot_dir: dir.join("screenshots"),
                ..fast_config()
            },
            filter,
            output_dir: dir.to_path_buf(),
            ..Default::default()
        };
        (TestRunner::with_browser(config, browser.clone()), browser)
    }

    #[tokio::test]
    async fn test_run_counts_and_screenshots() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut runner, _browser) = runner(tmp.path(), ScenarioFilter::default());

        let results = runner.run(&catalogue(), Arc::new(TestData::default())).await.unwrap();
        assert_eq!(results.total, 3);
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 2);
        assert_eq!(results.skipped, 0);
        assert!(!results.success());

        let failed = &results.results[1];
        assert_eq!(failed.error.as_deref(), Some("Assertion failed: not on settings: http://localhost:4100/#/"));
        let shot = PathBuf::from(failed.screenshot.as_ref().unwrap());
        assert!(shot.exists());
        let file_name = shot.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("COM-AUTO-008_0__"), "{}", file_name);
        assert!(file_name.ends_with(".png"));
        assert!(results.results[0].screenshot.is_none());
    }

    #[tokio::test]
    async fn test_state_is_reset_between_scenarios() {
        let tmp = tempfile::tempdir().unwrap();
        let filter = ScenarioFilter {
            suites: vec![Suite::Auth],
            ..Default::default()
        };
        let (mut runner, browser) = runner(tmp.path(), filter);

        let results = runner.run(&catalogue(), Arc::new(TestData::default())).await.unwrap();
        assert_eq!(results.total, 1);
        assert_eq!(results.skipped, 2);
        assert!(results.success());

        browser.with_state(|s| {
            assert!(s.local_storage.is_empty());
            assert_eq!(s.windows.len(), 1);
            assert_eq!(s.url, "http://localhost:4100/#/");
        });
        assert_eq!(browser.log().last().map(String::as_str), Some("refresh"));
    }

    #[tokio::test]
    async fn test_write_results() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut runner, _browser) = runner(tmp.path(), ScenarioFilter::default());
        let results = runner.run(&catalogue(), Arc::new(TestData::default())).await.unwrap();

        let path = runner.write_results(&results).unwrap();
        assert_eq!(path, tmp.path().join("test-results.json"));
        let parsed: TestSuiteResult = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.failed, 2);
        assert_eq!(parsed.results[0].suite, Suite::Auth);
        assert_eq!(parsed.results[1].marker, Marker::DataRequired);
    }

    #[tokio::test]
    async fn test_screenshot_failure_is_swallowed() {
        let browser = FakeBrowser::new("http://localhost:4100/#/");
        let tmp = tempfile::tempdir().unwrap();
        // A file where the directory should be
        let blocker = tmp.path().join("screenshots");
        std::fs::write(&blocker, b"").unwrap();
        assert!(save_screenshot(&browser, &blocker, "AUTH-AUTO-001").await.is_none());
    }
}
