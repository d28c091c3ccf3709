//! Scenario catalogue
//!
//! Every scenario is a plain `async fn(ScenarioContext) -> E2eResult<()>`
//! registered here with its id, suite and data marker. Scenarios start from
//! a browser sitting on the home page with empty localStorage and a single
//! window; the runner restores that state after each one.

use crate::check;
use crate::error::E2eResult;
use crate::fixtures::{Credentials, TestData};
use crate::locators::{home, settings as settings_loc};
use crate::scenario::{Scenario, ScenarioContext};

pub mod auth;
pub mod comment;
pub mod settings;

/// localStorage key holding the session token
pub const JWT_KEY: &str = "jwt";

/// The full catalogue, in execution order
pub fn all(data: &TestData) -> Vec<Scenario> {
    let mut scenarios = auth::scenarios();
    scenarios.extend(comment::scenarios(data));
    scenarios.extend(settings::scenarios());
    scenarios
}

/// Look a scenario up by exact id
pub fn find<'s>(scenarios: &'s [Scenario], id: &str) -> Option<&'s Scenario> {
    scenarios.iter().find(|s| s.id == id)
}

/// Log in as the account stored under `key` and land on the home page
pub(crate) async fn login_as(ctx: &ScenarioContext, key: &str) -> E2eResult<Credentials> {
    let user = ctx.data().credentials(key)?;
    let login = ctx.login();
    login.navigate().await?;
    login.login(&user.email, &user.password).await?;
    check!(
        ctx.home().is_page_loaded().await?,
        "home page did not load after logging in as {}",
        user.email
    );
    Ok(user)
}

/// Log in, then reach the settings form through the navigation bar
pub(crate) async fn go_to_settings(ctx: &ScenarioContext, key: &str) -> E2eResult<Credentials> {
    let user = login_as(ctx, key).await?;
    let page = ctx.settings();
    page.click(&home::NAV_SETTINGS_LINK).await?;
    check!(page.is_settings_page_loaded().await?, "settings page did not load");
    page.find(&settings_loc::USERNAME_INPUT).await?;
    Ok(user)
}

/// Log in, open the global feed and require at least one article
pub(crate) async fn go_to_global_feed(ctx: &ScenarioContext, key: &str) -> E2eResult<Credentials> {
    let user = login_as(ctx, key).await?;
    let home = ctx.home();
    home.click_global_feed_tab().await?;
    let titles = home.article_titles().await?;
    check!(!titles.is_empty(), "global feed has no articles");
    Ok(user)
}

/// Global feed, then the first article
pub(crate) async fn go_to_first_article(ctx: &ScenarioContext, key: &str) -> E2eResult<Credentials> {
    let user = go_to_global_feed(ctx, key).await?;
    ctx.home().open_first_article().await?;
    Ok(user)
}

pub(crate) async fn jwt(ctx: &ScenarioContext) -> E2eResult<Option<String>> {
    ctx.base().local_storage_item(JWT_KEY).await
}

/// Whether any message contains one of `needles`, ignoring case
pub(crate) fn any_message_contains(messages: &[String], needles: &[&str]) -> bool {
    messages.iter().any(|m| {
        let m = m.to_lowercase();
        needles.iter().any(|n| m.contains(&n.to_lowercase()))
    })
}
