//! Login page

use tracing::info;

use crate::error::E2eResult;
use crate::locators::{home, login};
use crate::pages::page_object;

page_object!(
    /// `#/login`
    LoginPage
);

impl<'a> LoginPage<'a> {
    pub const ROUTE: &'static str = "login";

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open(Self::ROUTE).await?;
        self.find(&login::EMAIL_INPUT).await?;
        Ok(())
    }

    pub async fn enter_email(&self, email: &str) -> E2eResult<()> {
        self.type_text(&login::EMAIL_INPUT, email).await
    }

    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.type_text(&login::PASSWORD_INPUT, password).await
    }

    pub async fn click_sign_in(&self) -> E2eResult<()> {
        self.click(&login::SIGN_IN_BUTTON).await
    }

    /// Submit credentials and wait for the app to leave the login route
    pub async fn login(&self, email: &str, password: &str) -> E2eResult<()> {
        info!("Logging in as {}", email);
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_sign_in().await?;
        self.wait_for_url_not_contains(Self::ROUTE).await?;
        Ok(())
    }

    pub async fn error_messages(&self) -> E2eResult<Vec<String>> {
        self.base.error_messages(&login::ERROR_MESSAGES).await
    }

    /// The navigation bar shows the user link
    pub async fn is_logged_in(&self) -> E2eResult<bool> {
        self.is_element_visible(&home::NAV_USER_LINK).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::fast_config;
    use crate::webdriver::fake::{FakeBrowser, FakeElement};

    #[tokio::test]
    async fn test_login_fills_form_and_follows_redirect() {
        let browser = FakeBrowser::new("http://localhost:4100/#/login");
        let config = fast_config();
        let email = browser.add(login::EMAIL_INPUT, FakeElement::new());
        let password = browser.add(login::PASSWORD_INPUT, FakeElement::new());
        let button = browser.add(login::SIGN_IN_BUTTON, FakeElement::new());
        browser.on_click(&button, |s| {
            s.url = "http://localhost:4100/#/".into();
            s.local_storage.insert("jwt".into(), "token".into());
            s.add(home::NAV_USER_LINK, FakeElement::new().text("alice"));
        });

        let page = LoginPage::new(&browser, &config);
        page.login("alice@example.com", "secret123").await.unwrap();

        assert_eq!(browser.value_of(&email), "alice@example.com");
        assert_eq!(browser.value_of(&password), "secret123");
        assert!(page.is_logged_in().await.unwrap());
        assert_eq!(page.local_storage_item("jwt").await.unwrap().as_deref(), Some("token"));
    }

    #[tokio::test]
    async fn test_failed_login_reports_errors() {
        let browser = FakeBrowser::new("http://localhost:4100/#/login");
        let config = fast_config();
        browser.add(login::EMAIL_INPUT, FakeElement::new());
        browser.add(login::PASSWORD_INPUT, FakeElement::new());
        let button = browser.add(login::SIGN_IN_BUTTON, FakeElement::new());
        browser.on_click(&button, |s| {
            s.add(login::ERROR_MESSAGES, FakeElement::new().text("email or password is invalid"));
        });

        let page = LoginPage::new(&browser, &config);
        page.login("alice@example.com", "wrong").await.unwrap();

        assert!(page.current_url().await.unwrap().ends_with("#/login"));
        assert_eq!(page.error_messages().await.unwrap(), vec!["email or password is invalid"]);
        assert!(!page.is_logged_in().await.unwrap());
    }
}
