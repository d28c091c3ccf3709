//! Explicit waits and retries

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::webdriver::{Browser, ElementRef};

/// Polls a condition against the browser until it holds or time runs out
#[derive(Clone, Copy)]
pub struct Wait<'a> {
    browser: &'a dyn Browser,
    timeout: Duration,
    poll_interval: Duration,
}

impl<'a> Wait<'a> {
    pub fn new(browser: &'a dyn Browser, timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            browser,
            timeout,
            poll_interval,
        }
    }

    /// Same browser and polling, different timeout
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    /// Poll `condition` until it yields `Some`.
    ///
    /// Transient driver errors count as "not yet"; anything else aborts.
    /// The condition always runs at least once, even with a zero timeout.
    pub async fn until<T, F, Fut>(&self, what: &str, mut condition: F) -> E2eResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Option<T>>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            match condition().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_transient() => debug!("{}: {}", what, e),
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(E2eError::Timeout(format!("{} after {:?}", what, self.timeout)));
            }
            sleep(self.poll_interval).await;
        }
    }

    /// First element matching `locator`
    pub async fn present(&self, locator: &Locator) -> E2eResult<ElementRef> {
        let browser = self.browser;
        let locator = *locator;
        self.until(&format!("presence of {}", locator), move || async move {
            Ok(browser.find_elements(&locator).await?.into_iter().next())
        })
        .await
    }

    /// First displayed element matching `locator`
    pub async fn visible(&self, locator: &Locator) -> E2eResult<ElementRef> {
        let browser = self.browser;
        let locator = *locator;
        self.until(&format!("visibility of {}", locator), move || async move {
            for element in browser.find_elements(&locator).await? {
                if browser.is_displayed(&element).await? {
                    return Ok(Some(element));
                }
            }
            Ok(None)
        })
        .await
    }

    /// First displayed and enabled element matching `locator`
    pub async fn clickable(&self, locator: &Locator) -> E2eResult<ElementRef> {
        let browser = self.browser;
        let locator = *locator;
        self.until(&format!("{} to be clickable", locator), move || async move {
            for element in browser.find_elements(&locator).await? {
                if browser.is_displayed(&element).await? && browser.is_enabled(&element).await? {
                    return Ok(Some(element));
                }
            }
            Ok(None)
        })
        .await
    }

    /// No displayed element matches `locator`
    pub async fn invisible(&self, locator: &Locator) -> E2eResult<()> {
        let browser = self.browser;
        let locator = *locator;
        self.until(&format!("invisibility of {}", locator), move || async move {
            for element in browser.find_elements(&locator).await? {
                match browser.is_displayed(&element).await {
                    Ok(true) => return Ok(None),
                    Ok(false) => {}
                    // Detached since the lookup
                    Err(e) if e.is_transient() => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(Some(()))
        })
        .await
    }

    /// Current URL contains `fragment`; returns that URL
    pub async fn url_contains(&self, fragment: &str) -> E2eResult<String> {
        let browser = self.browser;
        self.until(&format!("URL to contain {:?}", fragment), move || async move {
            let url = browser.current_url().await?;
            Ok(url.contains(fragment).then_some(url))
        })
        .await
    }

    /// Current URL no longer contains `fragment`
    pub async fn url_not_contains(&self, fragment: &str) -> E2eResult<String> {
        let browser = self.browser;
        self.until(&format!("URL to leave {:?}", fragment), move || async move {
            let url = browser.current_url().await?;
            Ok((!url.contains(fragment)).then_some(url))
        })
        .await
    }

    /// Attribute `name` of the first match equals `expected`
    pub async fn attribute_equals(&self, locator: &Locator, name: &str, expected: &str) -> E2eResult<()> {
        let browser = self.browser;
        let locator = *locator;
        self.until(
            &format!("{} of {} to equal {:?}", name, locator, expected),
            move || async move {
                let Some(element) = browser.find_elements(&locator).await?.into_iter().next() else {
                    return Ok(None);
                };
                let value = browser.attribute(&element, name).await?;
                Ok((value.as_deref() == Some(expected)).then_some(()))
            },
        )
        .await
    }
}

/// Run `op` up to `attempts` times, retrying only transient driver errors.
pub async fn retry<T, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, e);
                attempt += 1;
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::webdriver::fake::{FakeBrowser, FakeElement};

    const BUTTON: Locator = Locator::css("button.submit");

    fn wait(browser: &FakeBrowser) -> Wait<'_> {
        Wait::new(browser, Duration::from_millis(300), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_visible_after_a_few_polls() {
        let browser = FakeBrowser::new("http://app/");
        let el = browser.add(BUTTON, FakeElement::new().text("Go"));
        browser.appear_after(BUTTON, 3);

        let found = wait(&browser).visible(&BUTTON).await.unwrap();
        assert_eq!(found, el);
    }

    #[tokio::test]
    async fn test_visible_skips_hidden_matches() {
        let browser = FakeBrowser::new("http://app/");
        browser.add(BUTTON, FakeElement::new().hidden());
        let shown = browser.add(BUTTON, FakeElement::new());

        assert_eq!(wait(&browser).visible(&BUTTON).await.unwrap(), shown);
    }

    #[tokio::test]
    async fn test_timeout_names_the_condition() {
        let browser = FakeBrowser::new("http://app/");
        let err = wait(&browser).visible(&BUTTON).await.unwrap_err();
        match err {
            E2eError::Timeout(what) => assert!(what.contains("visibility of css=button.submit")),
            other => panic!("unexpected: {}", other),
        }
    }

    #[tokio::test]
    async fn test_invisible_when_absent_or_hidden() {
        let browser = FakeBrowser::new("http://app/");
        wait(&browser).invisible(&BUTTON).await.unwrap();
        browser.add(BUTTON, FakeElement::new().hidden());
        wait(&browser).invisible(&BUTTON).await.unwrap();
        browser.add(BUTTON, FakeElement::new());
        assert!(wait(&browser).invisible(&BUTTON).await.is_err());
    }

    #[tokio::test]
    async fn test_url_contains() {
        let browser = FakeBrowser::new("http://app/#/register");
        let w = wait(&browser);
        assert!(w.url_contains("register").await.unwrap().ends_with("#/register"));
        assert!(w.with_timeout(Duration::from_millis(20)).url_contains("settings").await.is_err());
        assert!(w.with_timeout(Duration::ZERO).url_not_contains("login").await.is_ok());
    }

    #[tokio::test]
    async fn test_attribute_equals() {
        let browser = FakeBrowser::new("http://app/");
        browser.add(BUTTON, FakeElement::new().attr("disabled", "true"));
        wait(&browser).attribute_equals(&BUTTON, "disabled", "true").await.unwrap();
        assert!(wait(&browser)
            .with_timeout(Duration::from_millis(20))
            .attribute_equals(&BUTTON, "disabled", "false")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_non_transient_error_aborts_immediately() {
        let browser = FakeBrowser::new("http://app/");
        let calls = AtomicU32::new(0);
        let result: E2eResult<()> = wait(&browser)
            .until("session", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(E2eError::WebDriver {
                    error: "invalid session id".into(),
                    message: "gone".into(),
                })
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_errors() {
        let calls = AtomicU32::new(0);
        let value = retry(3, Duration::from_millis(1), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(E2eError::WebDriver {
                    error: "stale element reference".into(),
                    message: "detached".into(),
                })
            } else {
                Ok(42)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);
        let result: E2eResult<()> = retry(2, Duration::from_millis(1), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(E2eError::WebDriver {
                error: "element click intercepted".into(),
                message: "overlay".into(),
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
