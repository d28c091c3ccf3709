//! Signup page

use tracing::info;

use crate::error::E2eResult;
use crate::locators::{home, signup};
use crate::pages::page_object;

page_object!(
    /// `#/register`
    SignupPage
);

impl<'a> SignupPage<'a> {
    pub const ROUTE: &'static str = "register";

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open(Self::ROUTE).await?;
        self.find(&signup::USERNAME_INPUT).await?;
        Ok(())
    }

    pub async fn enter_username(&self, username: &str) -> E2eResult<()> {
        self.type_text(&signup::USERNAME_INPUT, username).await
    }

    pub async fn enter_email(&self, email: &str) -> E2eResult<()> {
        self.type_text(&signup::EMAIL_INPUT, email).await
    }

    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.type_text(&signup::PASSWORD_INPUT, password).await
    }

    pub async fn click_sign_up(&self) -> E2eResult<()> {
        self.click(&signup::SIGN_UP_BUTTON).await
    }

    /// Fill all three fields (empty strings leave a field blank) and submit
    pub async fn signup(&self, username: &str, email: &str, password: &str) -> E2eResult<()> {
        info!("Signing up {:?} <{}>", username, email);
        self.enter_username(username).await?;
        self.enter_email(email).await?;
        self.enter_password(password).await?;
        self.click_sign_up().await
    }

    pub async fn error_messages(&self) -> E2eResult<Vec<String>> {
        self.base.error_messages(&signup::ERROR_MESSAGES).await
    }

    /// Left the register route and the user link appeared
    pub async fn is_signup_successful(&self) -> E2eResult<bool> {
        Ok(self.wait_for_url_not_contains(Self::ROUTE).await?
            && self.is_element_visible(&home::NAV_USER_LINK).await?)
    }
}
