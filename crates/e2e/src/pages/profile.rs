//! Profile page

use std::sync::LazyLock;

use regex::Regex;

use crate::error::E2eResult;
use crate::locators::profile;
use crate::pages::page_object;

page_object!(
    /// `#/@username`
    ProfilePage
);

/// `@username` path segment of a profile route
static PROFILE_ROUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([^/?#]+)").expect("profile route regex"));

/// Username segment of a profile URL (`.../#/@alice/favorites` gives `alice`)
pub fn username_in_url(url: &str) -> Option<String> {
    PROFILE_ROUTE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl<'a> ProfilePage<'a> {
    pub async fn navigate(&self, username: &str) -> E2eResult<()> {
        self.open(&format!("@{}", username)).await?;
        self.find(&profile::PROFILE_PAGE).await?;
        Ok(())
    }

    /// Bio paragraph text; empty when the profile has none
    pub async fn user_bio(&self) -> E2eResult<String> {
        self.find(&profile::USERNAME).await?;
        match self.find_all(&profile::BIO).await?.first() {
            Some(element) => Ok(self.browser().text(element).await?.trim().to_string()),
            None => Ok(String::new()),
        }
    }

    pub async fn username(&self) -> E2eResult<String> {
        self.text(&profile::USERNAME).await
    }

    pub async fn username_from_url(&self) -> E2eResult<Option<String>> {
        Ok(username_in_url(&self.current_url().await?))
    }
}
