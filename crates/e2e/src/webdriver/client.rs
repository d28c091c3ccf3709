//! W3C WebDriver session over HTTP

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::webdriver::protocol::{self, element_json};
use crate::webdriver::{Browser, ElementRef, Rect};

/// Requested browser capabilities
#[derive(Debug, Clone)]
pub struct Capabilities {
    /// W3C `browserName` (chrome, firefox, MicrosoftEdge)
    pub browser_name: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Implicit element lookup timeout; explicit waits do the real work
    pub implicit_wait: Duration,
    pub maximize: bool,
    pub extra_args: Vec<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            browser_name: "chrome".to_string(),
            headless: false,
            window_width: 1920,
            window_height: 1080,
            implicit_wait: Duration::ZERO,
            maximize: true,
            extra_args: Vec::new(),
        }
    }
}

impl Capabilities {
    /// Browser command-line arguments
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.headless {
            args.push("--headless".to_string());
        }
        args.push("--no-sandbox".to_string());
        args.push("--disable-dev-shm-usage".to_string());
        args.push("--disable-gpu".to_string());
        args.push(format!("--window-size={},{}", self.window_width, self.window_height));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// New-session request body
    pub fn to_json(&self) -> Value {
        let args = self.args();
        let mut always_match = json!({ "browserName": self.browser_name });
        match self.browser_name.as_str() {
            "firefox" => {
                always_match["moz:firefoxOptions"] = json!({ "args": args });
            }
            "MicrosoftEdge" | "edge" => {
                always_match["browserName"] = json!("MicrosoftEdge");
                always_match["ms:edgeOptions"] = json!({ "args": args });
            }
            _ => {
                always_match["goog:chromeOptions"] = json!({ "args": args });
            }
        }
        json!({ "capabilities": { "alwaysMatch": always_match } })
    }
}

/// An open WebDriver session
pub struct WebDriverClient {
    http: reqwest::Client,
    server_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Open a new session on the WebDriver server at `server_url`
    pub async fn connect(server_url: &str, caps: &Capabilities) -> E2eResult<Self> {
        let server_url = server_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        let url = format!("{}/session", server_url);
        let response = http.post(&url).json(&caps.to_json()).send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        let value = protocol::unwrap_value(ok, &body)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| E2eError::Protocol(format!("new session response has no sessionId: {}", value)))?
            .to_string();

        info!("WebDriver session {} started ({})", session_id, caps.browser_name);

        let client = Self {
            http,
            server_url,
            session_id,
        };

        client
            .command(
                Method::POST,
                "/timeouts",
                Some(json!({ "implicit": caps.implicit_wait.as_millis() as u64 })),
            )
            .await?;

        if caps.maximize {
            // Headless Chrome rejects maximize; the window-size argument already applies.
            if let Err(e) = client.command(Method::POST, "/window/maximize", Some(json!({}))).await {
                debug!("Window maximize not supported: {}", e);
            }
        }

        Ok(client)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> E2eResult<Value> {
        let url = format!("{}/session/{}{}", self.server_url, self.session_id, path);
        debug!("{} {}", method, path);

        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let ok = response.status().is_success();
        let body = response.text().await?;
        protocol::unwrap_value(ok, &body)
    }

    async fn element_command(
        &self,
        method: Method,
        element: &ElementRef,
        suffix: &str,
        body: Option<Value>,
    ) -> E2eResult<Value> {
        let path = format!("/element/{}{}", element.0, suffix);
        self.command(method, &path, body).await
    }
}

fn as_string(value: Value) -> E2eResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(E2eError::Protocol(format!("expected string, got {}", other))),
    }
}

#[async_trait]
impl Browser for WebDriverClient {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        as_string(self.command(Method::GET, "/url", None).await?)
    }

    async fn refresh(&self) -> E2eResult<()> {
        self.command(Method::POST, "/refresh", Some(json!({}))).await?;
        Ok(())
    }

    async fn back(&self) -> E2eResult<()> {
        self.command(Method::POST, "/back", Some(json!({}))).await?;
        Ok(())
    }

    async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        let value = self
            .command(Method::POST, "/elements", Some(protocol::find_body(locator)))
            .await?;
        protocol::parse_elements(&value)
    }

    async fn find_child_elements(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> E2eResult<Vec<ElementRef>> {
        let value = self
            .element_command(Method::POST, parent, "/elements", Some(protocol::find_body(locator)))
            .await?;
        protocol::parse_elements(&value)
    }

    async fn click(&self, element: &ElementRef) -> E2eResult<()> {
        self.element_command(Method::POST, element, "/click", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn double_click(&self, element: &ElementRef) -> E2eResult<()> {
        self.command(Method::POST, "/actions", Some(protocol::double_click_actions(element)))
            .await?;
        self.command(Method::DELETE, "/actions", None).await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> E2eResult<()> {
        self.element_command(Method::POST, element, "/clear", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()> {
        self.element_command(Method::POST, element, "/value", Some(json!({ "text": text })))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementRef) -> E2eResult<String> {
        as_string(self.element_command(Method::GET, element, "/text", None).await?)
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>> {
        let suffix = format!("/attribute/{}", name);
        match self.element_command(Method::GET, element, &suffix, None).await? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Ok(Some(other.to_string())),
        }
    }

    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value> {
        let suffix = format!("/property/{}", name);
        self.element_command(Method::GET, element, &suffix, None).await
    }

    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "/displayed", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool> {
        let value = self.element_command(Method::GET, element, "/enabled", None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn rect(&self, element: &ElementRef) -> E2eResult<Rect> {
        let value = self.element_command(Method::GET, element, "/rect", None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn window_handle(&self) -> E2eResult<String> {
        as_string(self.command(Method::GET, "/window", None).await?)
    }

    async fn window_handles(&self) -> E2eResult<Vec<String>> {
        let value = self.command(Method::GET, "/window/handles", None).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn switch_to_window(&self, handle: &str) -> E2eResult<()> {
        self.command(Method::POST, "/window", Some(json!({ "handle": handle })))
            .await?;
        Ok(())
    }

    async fn new_window(&self) -> E2eResult<String> {
        let value = self
            .command(Method::POST, "/window/new", Some(json!({ "type": "tab" })))
            .await?;
        value
            .get("handle")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| E2eError::Protocol(format!("new window response has no handle: {}", value)))
    }

    async fn close_window(&self) -> E2eResult<()> {
        self.command(Method::DELETE, "/window", None).await?;
        Ok(())
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let encoded = as_string(self.command(Method::GET, "/screenshot", None).await?)?;
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    }

    async fn quit(&self) -> E2eResult<()> {
        info!("Closing WebDriver session {}", self.session_id);
        self.command(Method::DELETE, "", None).await?;
        Ok(())
    }
}

/// Reference argument for [`Browser::execute`]
pub fn element_arg(element: &ElementRef) -> Value {
    element_json(element)
}
