//! Settings page

use serde_json::Value;

use crate::error::E2eResult;
use crate::locator::Locator;
use crate::locators::{home, settings};
use crate::pages::page_object;

page_object!(
    /// `#/settings`: profile form and logout
    SettingsPage
);

/// Values for [`SettingsPage::update_settings`]; empty fields are left untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsForm<'s> {
    pub image_url: &'s str,
    pub username: &'s str,
    pub bio: &'s str,
    pub email: &'s str,
    pub password: &'s str,
}

impl<'a> SettingsPage<'a> {
    pub const ROUTE: &'static str = "settings";

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open(Self::ROUTE).await
    }

    pub async fn is_settings_page_loaded(&self) -> E2eResult<bool> {
        Ok(self.is_element_visible(&settings::SETTINGS_PAGE).await?
            && self.is_element_visible(&settings::UPDATE_BUTTON).await?)
    }

    pub async fn enter_image_url(&self, url: &str) -> E2eResult<()> {
        self.type_text(&settings::PROFILE_PICTURE_INPUT, url).await
    }

    pub async fn enter_username(&self, username: &str) -> E2eResult<()> {
        self.type_text(&settings::USERNAME_INPUT, username).await
    }

    pub async fn enter_bio(&self, bio: &str) -> E2eResult<()> {
        self.type_text(&settings::BIO_TEXTAREA, bio).await
    }

    pub async fn enter_email(&self, email: &str) -> E2eResult<()> {
        self.type_text(&settings::EMAIL_INPUT, email).await
    }

    pub async fn enter_password(&self, password: &str) -> E2eResult<()> {
        self.type_text(&settings::PASSWORD_INPUT, password).await
    }

    pub async fn click_update_button(&self) -> E2eResult<()> {
        self.click(&settings::UPDATE_BUTTON).await
    }

    pub async fn click_logout_button(&self) -> E2eResult<()> {
        self.click(&settings::LOGOUT_BUTTON).await
    }

    pub async fn click_logo_button(&self) -> E2eResult<()> {
        self.click(&home::LOGO).await
    }

    /// Fill every non-empty field of `form`, then submit
    pub async fn update_settings(&self, form: &SettingsForm<'_>) -> E2eResult<()> {
        let fields = [
            (&settings::PROFILE_PICTURE_INPUT, form.image_url),
            (&settings::USERNAME_INPUT, form.username),
            (&settings::BIO_TEXTAREA, form.bio),
            (&settings::EMAIL_INPUT, form.email),
            (&settings::PASSWORD_INPUT, form.password),
        ];
        for (locator, value) in fields {
            if !value.is_empty() {
                self.type_text(locator, value).await?;
            }
        }
        self.click_update_button().await
    }

    /// Live `value` property of a form field
    pub async fn field_value(&self, locator: &Locator) -> E2eResult<String> {
        Ok(match self.property(locator, "value").await? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Browser constraint-validation message, empty when the field is valid
    pub async fn validation_message(&self, locator: &Locator) -> E2eResult<String> {
        Ok(match self.property(locator, "validationMessage").await? {
            Value::String(s) => s,
            _ => String::new(),
        })
    }

    pub async fn error_messages(&self) -> E2eResult<Vec<String>> {
        self.base.error_messages(&settings::ERROR_MESSAGES).await
    }
}
