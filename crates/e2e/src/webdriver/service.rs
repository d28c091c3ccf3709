//! Driver service management - spawning and health checking chromedriver

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running WebDriver server process
pub struct DriverService {
    child: Child,
    pub url: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

impl DriverService {
    /// Spawn the driver binary and wait until it reports ready
    pub async fn spawn(config: ServiceConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", config.binary_path.display(), port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.arg(format!("--port={}", port));
        if config.verbose {
            cmd.arg("--verbose");
        }
        cmd.stdout(Stdio::null()).stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                E2eError::DriverNotFound(config.binary_path.display().to_string())
            } else {
                E2eError::DriverStartup(format!(
                    "Failed to spawn {}: {}",
                    config.binary_path.display(),
                    e
                ))
            }
        })?;

        let service = DriverService { child, url, port };

        service.wait_for_ready(config.startup_timeout).await?;

        info!("WebDriver is ready at {}", service.url);
        Ok(service)
    }

    /// Poll `GET /status` until the driver accepts new sessions
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    match resp.json::<StatusResponse>().await {
                        Ok(status) if status.value.ready => return Ok(()),
                        Ok(_) => warn!("WebDriver reports not ready"),
                        Err(e) => warn!("Unreadable status response: {}", e),
                    }
                }
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver to start...");
                    }
                    // Connection refused is expected while the driver is starting
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    /// Base URL of the WebDriver endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the driver process
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(300));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverService {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for spawning a driver service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path to the chromedriver (or geckodriver/msedgedriver) binary
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for driver startup
    pub startup_timeout: Duration,

    /// Pass --verbose to the driver
    pub verbose: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("chromedriver"),
            port: None,
            startup_timeout: Duration::from_secs(30),
            verbose: false,
        }
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port1 = find_free_port().unwrap();
        let port2 = find_free_port().unwrap();

        // Ports should be in valid range
        assert!(port1 > 1024);
        assert!(port2 > 1024);
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let config = ServiceConfig {
            binary_path: PathBuf::from("/nonexistent/chromedriver-for-tests"),
            startup_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        match DriverService::spawn(config).await {
            Err(E2eError::DriverNotFound(path)) => assert!(path.contains("chromedriver-for-tests")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("spawn should fail"),
        }
    }
}
