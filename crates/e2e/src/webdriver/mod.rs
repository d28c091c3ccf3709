//! Browser driver seam
//!
//! Page objects only talk to [`Browser`]. The production implementation is
//! [`WebDriverClient`], a W3C WebDriver session over HTTP; unit tests use an
//! in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::E2eResult;
use crate::locator::Locator;

pub mod client;
pub mod protocol;
pub mod service;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{Capabilities, WebDriverClient};
pub use service::{DriverService, ServiceConfig};

/// Opaque reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef(pub String);

/// Element geometry in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Operations a page object needs from a browser session
#[async_trait]
pub trait Browser: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;
    async fn current_url(&self) -> E2eResult<String>;
    async fn refresh(&self) -> E2eResult<()>;
    async fn back(&self) -> E2eResult<()>;

    /// All matches for `locator`; empty when nothing matches.
    async fn find_elements(&self, locator: &Locator) -> E2eResult<Vec<ElementRef>>;
    async fn find_child_elements(
        &self,
        parent: &ElementRef,
        locator: &Locator,
    ) -> E2eResult<Vec<ElementRef>>;

    async fn click(&self, element: &ElementRef) -> E2eResult<()>;
    async fn double_click(&self, element: &ElementRef) -> E2eResult<()>;
    async fn clear(&self, element: &ElementRef) -> E2eResult<()>;
    async fn send_keys(&self, element: &ElementRef, text: &str) -> E2eResult<()>;

    async fn text(&self, element: &ElementRef) -> E2eResult<String>;
    async fn attribute(&self, element: &ElementRef, name: &str) -> E2eResult<Option<String>>;
    async fn property(&self, element: &ElementRef, name: &str) -> E2eResult<Value>;
    async fn is_displayed(&self, element: &ElementRef) -> E2eResult<bool>;
    async fn is_enabled(&self, element: &ElementRef) -> E2eResult<bool>;
    async fn rect(&self, element: &ElementRef) -> E2eResult<Rect>;

    /// Run a synchronous script; `arguments[i]` in the script maps to `args[i]`.
    async fn execute(&self, script: &str, args: Vec<Value>) -> E2eResult<Value>;

    async fn window_handle(&self) -> E2eResult<String>;
    async fn window_handles(&self) -> E2eResult<Vec<String>>;
    async fn switch_to_window(&self, handle: &str) -> E2eResult<()>;
    /// Open a new tab and return its handle without switching to it.
    async fn new_window(&self) -> E2eResult<String>;
    async fn close_window(&self) -> E2eResult<()>;

    /// PNG bytes of the current viewport.
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    async fn quit(&self) -> E2eResult<()>;
}

/// First match for `locator`, or a W3C `no such element` error.
pub async fn find_element(browser: &dyn Browser, locator: &Locator) -> E2eResult<ElementRef> {
    browser
        .find_elements(locator)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| protocol::no_such_element(locator))
}
