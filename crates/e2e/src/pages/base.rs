//! Shared page-object behaviour

use serde_json::{json, Value};
use tracing::debug;

use crate::config::SuiteConfig;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::wait::{retry, Wait};
use crate::webdriver::{Browser, ElementRef};

/// Ctrl+A then Backspace, for inputs whose framework ignores `clear`
const SELECT_ALL_DELETE: &str = "\u{E009}a\u{E009}\u{E003}";

/// Browser plus suite settings; every page object wraps one
#[derive(Clone, Copy)]
pub struct BasePage<'a> {
    browser: &'a dyn Browser,
    config: &'a SuiteConfig,
}

impl<'a> BasePage<'a> {
    pub fn new(browser: &'a dyn Browser, config: &'a SuiteConfig) -> Self {
        Self { browser, config }
    }

    pub fn browser(&self) -> &'a dyn Browser {
        self.browser
    }

    pub fn config(&self) -> &'a SuiteConfig {
        self.config
    }

    /// Page-load wait
    pub fn wait(&self) -> Wait<'a> {
        Wait::new(self.browser, self.config.timeout, self.config.poll_interval)
    }

    /// Element visibility wait
    pub fn short_wait(&self) -> Wait<'a> {
        Wait::new(self.browser, self.config.wait, self.config.poll_interval)
    }

    /// Navigate to an app route such as `login` or `@alice`
    pub async fn open(&self, route: &str) -> E2eResult<()> {
        let url = self.config.url_for(route);
        debug!("Opening {}", url);
        self.browser.goto(&url).await
    }

    /// First visible match, waiting up to the page-load timeout
    pub async fn find(&self, locator: &Locator) -> E2eResult<ElementRef> {
        self.wait().visible(locator).await
    }

    /// Every current match, without waiting
    pub async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<ElementRef>> {
        self.browser.find_elements(locator).await
    }

    pub async fn click(&self, locator: &Locator) -> E2eResult<()> {
        let wait = self.wait();
        let browser = self.browser;
        let delay = self.config.poll_interval;
        retry(self.config.retry_count, delay, || async move {
            let element = wait.clickable(locator).await?;
            browser.click(&element).await
        })
        .await
    }

    /// Replace the field's contents with `text`
    pub async fn type_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        let element = self.find(locator).await?;
        self.browser.clear(&element).await?;
        if !text.is_empty() {
            self.browser.send_keys(&element, text).await?;
        }
        Ok(())
    }

    /// Empty a field so the app's own state sees the change
    pub async fn clear_field(&self, locator: &Locator) -> E2eResult<()> {
        let element = self.find(locator).await?;
        self.browser.clear(&element).await?;
        self.browser.send_keys(&element, SELECT_ALL_DELETE).await
    }

    pub async fn text(&self, locator: &Locator) -> E2eResult<String> {
        let element = self.find(locator).await?;
        Ok(self.browser.text(&element).await?.trim().to_string())
    }

    pub async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>> {
        let element = self.wait().present(locator).await?;
        self.browser.attribute(&element, name).await
    }

    pub async fn property(&self, locator: &Locator, name: &str) -> E2eResult<Value> {
        let element = self.wait().present(locator).await?;
        self.browser.property(&element, name).await
    }

    /// Visible within the short wait; a timeout means "no"
    pub async fn is_element_visible(&self, locator: &Locator) -> E2eResult<bool> {
        match self.short_wait().visible(locator).await {
            Ok(_) => Ok(true),
            Err(E2eError::Timeout(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Absent or hidden within the short wait
    pub async fn is_element_hidden(&self, locator: &Locator) -> E2eResult<bool> {
        match self.short_wait().invisible(locator).await {
            Ok(()) => Ok(true),
            Err(E2eError::Timeout(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Present right now
    pub async fn is_element_present(&self, locator: &Locator) -> E2eResult<bool> {
        Ok(!self.browser.find_elements(locator).await?.is_empty())
    }

    pub async fn wait_for_url_contains(&self, fragment: &str) -> E2eResult<bool> {
        match self.wait().url_contains(fragment).await {
            Ok(_) => Ok(true),
            Err(E2eError::Timeout(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn wait_for_url_not_contains(&self, fragment: &str) -> E2eResult<bool> {
        match self.wait().url_not_contains(fragment).await {
            Ok(_) => Ok(true),
            Err(E2eError::Timeout(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.browser.current_url().await
    }

    pub async fn local_storage_item(&self, key: &str) -> E2eResult<Option<String>> {
        let value = self
            .browser
            .execute("return window.localStorage.getItem(arguments[0]);", vec![json!(key)])
            .await?;
        Ok(match value {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub async fn set_local_storage_item(&self, key: &str, value: &str) -> E2eResult<()> {
        self.browser
            .execute(
                "window.localStorage.setItem(arguments[0], arguments[1]);",
                vec![json!(key), json!(value)],
            )
            .await?;
        Ok(())
    }

    pub async fn remove_local_storage_item(&self, key: &str) -> E2eResult<()> {
        self.browser
            .execute("window.localStorage.removeItem(arguments[0]);", vec![json!(key)])
            .await?;
        Ok(())
    }

    pub async fn clear_local_storage(&self) -> E2eResult<()> {
        self.browser.execute("window.localStorage.clear();", vec![]).await?;
        Ok(())
    }

    /// Texts of the error list items, or empty when none show up in time
    pub async fn error_messages(&self, locator: &Locator) -> E2eResult<Vec<String>> {
        if !self.is_element_visible(locator).await? {
            return Ok(Vec::new());
        }
        let mut messages = Vec::new();
        for element in self.find_all(locator).await? {
            match self.browser.text(&element).await {
                Ok(text) => messages.push(text.trim().to_string()),
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::fast_config;
    use crate::webdriver::fake::{FakeBrowser, FakeElement};

    const INPUT: Locator = Locator::css("input.name");
    const ERRORS: Locator = Locator::css(".error-messages li");

    #[tokio::test]
    async fn test_open_uses_hash_route() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        BasePage::new(&browser, &config).open("settings").await.unwrap();
        assert_eq!(browser.log(), vec!["goto http://localhost:4100/#/settings"]);
    }

    #[tokio::test]
    async fn test_type_text_replaces_value() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let input = browser.add(INPUT, FakeElement::new().value("old"));
        let page = BasePage::new(&browser, &config);

        page.type_text(&INPUT, "new").await.unwrap();
        assert_eq!(browser.value_of(&input), "new");

        page.type_text(&INPUT, "").await.unwrap();
        assert_eq!(browser.value_of(&input), "");
    }

    #[tokio::test]
    async fn test_clear_field_sends_select_all_delete() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let input = browser.add(INPUT, FakeElement::new().value("alice"));

        BasePage::new(&browser, &config).clear_field(&INPUT).await.unwrap();
        assert_eq!(browser.value_of(&input), "");
        assert!(browser.log().iter().any(|l| l.starts_with("clear ")));
    }

    #[tokio::test]
    async fn test_visibility_and_presence() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let page = BasePage::new(&browser, &config);

        assert!(!page.is_element_visible(&INPUT).await.unwrap());
        assert!(!page.is_element_present(&INPUT).await.unwrap());

        browser.add(INPUT, FakeElement::new().hidden());
        assert!(!page.is_element_visible(&INPUT).await.unwrap());
        assert!(page.is_element_hidden(&INPUT).await.unwrap());
        assert!(page.is_element_present(&INPUT).await.unwrap());

        browser.add(INPUT, FakeElement::new());
        assert!(!page.is_element_hidden(&INPUT).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let page = BasePage::new(&browser, &config);

        assert_eq!(page.local_storage_item("jwt").await.unwrap(), None);
        page.set_local_storage_item("jwt", "token").await.unwrap();
        assert_eq!(page.local_storage_item("jwt").await.unwrap().as_deref(), Some("token"));
        page.remove_local_storage_item("jwt").await.unwrap();
        assert_eq!(page.local_storage_item("jwt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_messages() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let page = BasePage::new(&browser, &config);

        assert!(page.error_messages(&ERRORS).await.unwrap().is_empty());

        browser.add(ERRORS, FakeElement::new().text(" email can't be blank "));
        browser.add(ERRORS, FakeElement::new().text("password can't be blank"));
        assert_eq!(
            page.error_messages(&ERRORS).await.unwrap(),
            vec!["email can't be blank", "password can't be blank"]
        );
    }

    #[tokio::test]
    async fn test_click_waits_for_element() {
        let browser = FakeBrowser::new("about:blank");
        let config = fast_config();
        let button = browser.add(INPUT, FakeElement::new());
        browser.appear_after(INPUT, 2);

        BasePage::new(&browser, &config).click(&INPUT).await.unwrap();
        assert!(browser.log().contains(&format!("click {}", button.0)));
    }
}
