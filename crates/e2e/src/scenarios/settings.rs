//! Settings form scenarios (SET-AUTO-*)
//!
//! Scenarios that change account data run against `fullDataUser` and put
//! the original value back before finishing, pass or fail, so the accounts
//! other suites log in with stay intact.

use std::future::Future;

use tracing::{info, warn};

use crate::check;
use crate::error::E2eResult;
use crate::fixtures::Credentials;
use crate::locator::Locator;
use crate::locators::{home, settings as settings_loc};
use crate::pages::{SettingsForm, SettingsPage};
use crate::scenario::{Marker, Scenario, ScenarioContext, Suite};
use crate::scenarios::{any_message_contains, go_to_settings, login_as};

const DEFAULT_AVATAR: &str = "smiley-cyrus";
const VALID_IMAGE_URL: &str = "https://picsum.photos/200";
/// Resolves, but not to an image
const NON_IMAGE_URL: &str = "https://elice.com";

const WHITESPACE_PASSWORD_ERRORS: &[&str] = &[
    "leading or trailing whitespace",
    "leading or trailing spaces",
    "cannot contain whitespace",
    "cannot include whitespace",
];

fn settings<F, Fut>(id: &str, name: &str, marker: Marker, run: F) -> Scenario
where
    F: Fn(ScenarioContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    Scenario::new(id, name, Suite::Settings, marker, run)
}

pub fn scenarios() -> Vec<Scenario> {
    use Marker::*;
    vec![
        settings("SET-AUTO-001", "access settings page", DataNotRequired, access_settings),
        settings("SET-AUTO-002", "settings page layout", DataNotRequired, settings_layout),
        settings("SET-AUTO-003", "settings placeholders", DataNotRequired, settings_placeholders),
        settings("SET-AUTO-004", "logout from settings", DataNotRequired, logout_from_settings),
        settings("SET-AUTO-005", "remove profile image", DataNotRequired, remove_profile_image),
        settings("SET-AUTO-006", "update profile image", DataNotRequired, update_profile_image),
        settings("SET-AUTO-007", "non-image URL falls back to default avatar", DataNotRequired, non_image_url),
        settings("SET-AUTO-008", "empty username is ignored", DataNotRequired, empty_username),
        settings("SET-AUTO-009", "duplicate username", DataNotRequired, duplicate_username),
        settings("SET-AUTO-010", "valid username update", DataNotRequired, valid_username),
        settings("SET-AUTO-011", "bio update", DataNotRequired, bio_update),
        settings("SET-AUTO-012", "remove bio", DataNotRequired, remove_bio),
        settings("SET-AUTO-013", "multiline bio", DataNotRequired, multiline_bio),
        settings("SET-AUTO-014", "email without @", DataNotRequired, email_without_at),
        settings("SET-AUTO-015", "email with forbidden characters", DataNotRequired, email_forbidden_chars),
        settings("SET-AUTO-016", "empty email keeps the old one", DataNotRequired, empty_email),
        settings("SET-AUTO-017", "duplicate email", DataRequired, duplicate_email),
        settings("SET-AUTO-018", "new valid email", DataNotRequired, new_valid_email),
        settings("SET-AUTO-019", "new valid password", DataRequired, new_valid_password),
        settings("SET-AUTO-020", "empty password keeps the old one", DataNotRequired, empty_password),
        settings("SET-AUTO-021", "password with leading space", DataNotRequired, |ctx| {
            whitespace_password(ctx, " testpassword")
        }),
        settings("SET-AUTO-022", "password with trailing space", DataRequired, |ctx| {
            whitespace_password(ctx, "testpassword ")
        }),
        settings("SET-AUTO-023", "whitespace-only password", DataRequired, |ctx| {
            whitespace_password(ctx, " ")
        }),
        settings("SET-AUTO-024", "form is pre-filled with the current user", DataRequired, prefilled_form),
    ]
}

/// Submit and wait for the app to leave the settings route
async fn submit(page: &SettingsPage<'_>) -> E2eResult<()> {
    page.click_update_button().await?;
    check!(
        page.wait_for_url_not_contains(SettingsPage::ROUTE).await?,
        "still on settings after submitting: {:?}",
        page.error_messages().await?
    );
    Ok(())
}

/// `value` of a field once the app has filled it in
async fn populated_value(page: &SettingsPage<'_>, locator: &Locator) -> E2eResult<String> {
    let page = *page;
    let locator = *locator;
    page.wait()
        .until(&format!("{} to be filled in", locator), move || async move {
            let value = page.field_value(&locator).await?;
            Ok((!value.is_empty()).then_some(value))
        })
        .await
}

/// Reopen settings, logging in again with `email`/`password` if the
/// session is gone, once the form has been filled in by the app
async fn reopen_settings<'c>(ctx: &'c ScenarioContext, email: &str, password: &str) -> E2eResult<SettingsPage<'c>> {
    let page = ctx.settings();
    page.navigate().await?;
    if !page.is_settings_page_loaded().await? {
        log_back_in(ctx, email, password).await?;
        page.navigate().await?;
    }
    page.find(&settings_loc::USERNAME_INPUT).await?;
    populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    Ok(page)
}

/// Write `form` back
async fn restore(ctx: &ScenarioContext, email: &str, password: &str, form: SettingsForm<'_>) -> E2eResult<()> {
    let page = reopen_settings(ctx, email, password).await?;
    info!("Restoring account settings");
    page.update_settings(&form).await?;
    submit(&page).await
}

/// Put `bio` back, clearing the field when it was empty
async fn restore_bio(ctx: &ScenarioContext, user: &Credentials, bio: &str) -> E2eResult<()> {
    let page = reopen_settings(ctx, &user.email, &user.password).await?;
    info!("Restoring bio");
    page.clear_field(&settings_loc::BIO_TEXTAREA).await?;
    if !bio.is_empty() {
        page.enter_bio(bio).await?;
    }
    submit(&page).await
}

/// Run `restore` whatever `outcome` was; the scenario's own error wins
async fn restoring(outcome: E2eResult<()>, restore: impl Future<Output = E2eResult<()>>) -> E2eResult<()> {
    let restored = restore.await;
    if let Err(e) = &restored {
        warn!("Account settings not restored: {}", e);
    }
    outcome.and(restored)
}

async fn logout_via_settings(ctx: &ScenarioContext) -> E2eResult<()> {
    let page = ctx.settings();
    page.navigate().await?;
    page.click_logout_button().await?;
    check!(ctx.home().is_page_loaded().await?, "home page did not load after logout");
    Ok(())
}

async fn log_back_in(ctx: &ScenarioContext, email: &str, password: &str) -> E2eResult<()> {
    let login = ctx.login();
    login.navigate().await?;
    login.login(email, password).await?;
    check!(login.is_logged_in().await?, "could not log in as {} with the expected password", email);
    Ok(())
}

async fn access_settings(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    check!(page.wait_for_url_contains("/settings").await?, "not on the settings route");
    check!(page.is_settings_page_loaded().await?, "settings page did not load");
    check!(page.is_element_visible(&settings_loc::UPDATE_BUTTON).await?, "update button not shown");
    Ok(())
}

async fn settings_layout(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    let title = page.text(&settings_loc::TITLE).await?;
    check!(title == "Your Settings", "page title is {:?}", title);

    for locator in [
        &settings_loc::PROFILE_PICTURE_INPUT,
        &settings_loc::USERNAME_INPUT,
        &settings_loc::BIO_TEXTAREA,
        &settings_loc::EMAIL_INPUT,
        &settings_loc::PASSWORD_INPUT,
        &settings_loc::UPDATE_BUTTON,
        &settings_loc::LOGOUT_BUTTON,
    ] {
        check!(page.is_element_present(locator).await?, "missing {}", locator);
    }
    Ok(())
}

async fn settings_placeholders(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    for (locator, expected) in [
        (&settings_loc::PROFILE_PICTURE_INPUT, "URL of profile picture"),
        (&settings_loc::USERNAME_INPUT, "Username"),
        (&settings_loc::BIO_TEXTAREA, "Short bio about you"),
        (&settings_loc::EMAIL_INPUT, "Email"),
        (&settings_loc::PASSWORD_INPUT, "New Password"),
    ] {
        let placeholder = page.attribute(locator, "placeholder").await?.unwrap_or_default();
        check!(placeholder.contains(expected), "placeholder {:?}, expected {:?}", placeholder, expected);
    }
    Ok(())
}

async fn logout_from_settings(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    ctx.settings().click_logout_button().await?;
    let home = ctx.home();
    check!(home.is_page_loaded().await?, "home page did not load after logout");
    check!(home.is_element_visible(&home::NAV_SIGN_IN_LINK).await?, "Sign in link not shown after logout");
    Ok(())
}

async fn remove_profile_image(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::PROFILE_PICTURE_INPUT).await?;
    submit(&page).await?;

    let src = ctx.home().nav_user_pic_src().await?.unwrap_or_default();
    check!(
        src.is_empty()
            || src.to_lowercase().contains("default")
            || src.contains(DEFAULT_AVATAR)
            || src.starts_with("data:"),
        "profile image not reset to the default: {}",
        src
    );
    Ok(())
}

async fn update_profile_image(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.enter_image_url(VALID_IMAGE_URL).await?;
    submit(&page).await?;

    let src = ctx.home().nav_user_pic_src().await?.unwrap_or_default();
    check!(src.contains(VALID_IMAGE_URL), "profile image is {}, expected {}", src, VALID_IMAGE_URL);
    Ok(())
}

async fn non_image_url(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.enter_image_url(NON_IMAGE_URL).await?;
    submit(&page).await?;

    let src = ctx.home().nav_user_pic_src().await?.unwrap_or_default();
    check!(src.contains(DEFAULT_AVATAR), "expected the default avatar, got {}", src);
    Ok(())
}

async fn empty_username(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let original = ctx.home().navigate_user_name().await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::USERNAME_INPUT).await?;
    page.click_update_button().await?;
    check!(page.is_settings_page_loaded().await?, "left the settings page");

    page.click_logo_button().await?;
    let current = ctx.home().navigate_user_name().await?;
    check!(current == original, "username changed from {:?} to {:?}", original, current);
    Ok(())
}

async fn duplicate_username(ctx: ScenarioContext) -> E2eResult<()> {
    let taken = ctx.data().credentials("fullDataUser")?.username;
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::USERNAME_INPUT).await?;
    page.enter_username(&taken).await?;
    page.click_update_button().await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["username has already been taken"]),
        "expected a taken username error, got {:?}",
        messages
    );
    Ok(())
}

async fn valid_username(ctx: ScenarioContext) -> E2eResult<()> {
    let new_username = ctx.data().text("validUsernameUpdate")?;
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    let outcome: E2eResult<()> = async {
        page.clear_field(&settings_loc::USERNAME_INPUT).await?;
        page.enter_username(&new_username).await?;
        submit(&page).await?;

        let current = ctx.home().navigate_user_name().await?;
        check!(current == new_username, "nav shows {:?}, expected {:?}", current, new_username);
        Ok(())
    }
    .await;

    let form = SettingsForm {
        username: &user.username,
        ..Default::default()
    };
    restoring(outcome, restore(&ctx, &user.email, &user.password, form)).await
}

async fn bio_update(ctx: ScenarioContext) -> E2eResult<()> {
    let new_bio = ctx.data().text("shortNewBio")?;
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    let original = page.field_value(&settings_loc::BIO_TEXTAREA).await?;

    let outcome: E2eResult<()> = async {
        page.clear_field(&settings_loc::BIO_TEXTAREA).await?;
        page.enter_bio(&new_bio).await?;
        submit(&page).await?;

        let profile = ctx.profile();
        profile.navigate(&user.username).await?;
        let bio = profile.user_bio().await?;
        check!(bio == new_bio, "bio is {:?}, expected {:?}", bio, new_bio);
        Ok(())
    }
    .await;

    restoring(outcome, restore_bio(&ctx, &user, &original)).await
}

async fn remove_bio(ctx: ScenarioContext) -> E2eResult<()> {
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    let original = page.field_value(&settings_loc::BIO_TEXTAREA).await?;

    let outcome: E2eResult<()> = async {
        page.clear_field(&settings_loc::BIO_TEXTAREA).await?;
        submit(&page).await?;

        let profile = ctx.profile();
        profile.navigate(&user.username).await?;
        let bio = profile.user_bio().await?;
        check!(bio.is_empty(), "bio still shows {:?}", bio);
        Ok(())
    }
    .await;

    // Fall back to the fixture bio when the form came up empty
    let bio = match (original.as_str(), user.new_bio.as_deref()) {
        ("", Some(fixture)) => fixture,
        (current, _) => current,
    };
    if bio.is_empty() {
        return outcome;
    }
    restoring(outcome, restore_bio(&ctx, &user, bio)).await
}

async fn multiline_bio(ctx: ScenarioContext) -> E2eResult<()> {
    let text = ctx.data().text("newLinetext")?;
    let user = go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::BIO_TEXTAREA).await?;
    page.enter_bio(&text).await?;
    submit(&page).await?;

    let profile = ctx.profile();
    profile.navigate(&user.username).await?;
    let bio = profile.user_bio().await?;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        check!(bio.contains(line.trim()), "bio {:?} is missing line {:?}", bio, line);
    }
    Ok(())
}

/// Enter `email`, submit, and expect the browser to block the form
async fn blocked_email(ctx: &ScenarioContext, email: &str) -> E2eResult<String> {
    go_to_settings(ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::EMAIL_INPUT).await?;
    page.update_settings(&SettingsForm {
        email,
        ..Default::default()
    })
    .await?;

    let message = page.validation_message(&settings_loc::EMAIL_INPUT).await?;
    info!("Validation message for {:?}: {:?}", email, message);
    check!(page.is_settings_page_loaded().await?, "form with {:?} was submitted", email);
    Ok(message)
}

async fn email_without_at(ctx: ScenarioContext) -> E2eResult<()> {
    let email = ctx.data().text("noAtMarkEmail")?;
    let message = blocked_email(&ctx, &email).await?;
    check!(
        message.contains("Please include an '@'") || message.contains("'@'"),
        "unexpected validation message {:?}",
        message
    );
    Ok(())
}

async fn email_forbidden_chars(ctx: ScenarioContext) -> E2eResult<()> {
    let email = ctx.data().text("includeNotAllowedCharEmail")?;
    let message = blocked_email(&ctx, &email).await?;
    check!(
        message.contains("A part following '@' should not contain the symbol") || message.contains("'@'"),
        "unexpected validation message {:?}",
        message
    );
    Ok(())
}

async fn empty_email(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    let original = populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    page.clear_field(&settings_loc::EMAIL_INPUT).await?;
    page.click_update_button().await?;

    ctx.browser().refresh().await?;
    page.navigate().await?;
    let current = populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    check!(current == original, "email changed from {:?} to {:?}", original, current);
    Ok(())
}

async fn duplicate_email(ctx: ScenarioContext) -> E2eResult<()> {
    let taken = ctx.data().text("email")?;
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::EMAIL_INPUT).await?;
    page.enter_email(&taken).await?;
    page.click_update_button().await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["email has already been taken"]),
        "expected a taken email error, got {:?}",
        messages
    );
    Ok(())
}

async fn new_valid_email(ctx: ScenarioContext) -> E2eResult<()> {
    let new_email = ctx.data().text("newValidEmail")?;
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    let outcome: E2eResult<()> = async {
        page.clear_field(&settings_loc::EMAIL_INPUT).await?;
        page.enter_email(&new_email).await?;
        submit(&page).await?;

        page.navigate().await?;
        let current = populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
        check!(current == new_email, "email is {:?}, expected {:?}", current, new_email);
        Ok(())
    }
    .await;

    let form = SettingsForm {
        email: &user.email,
        ..Default::default()
    };
    restoring(outcome, restore(&ctx, &new_email, &user.password, form)).await
}

async fn new_valid_password(ctx: ScenarioContext) -> E2eResult<()> {
    let new_password = ctx.data().text("newValidPassword")?;
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    let outcome: E2eResult<()> = async {
        page.enter_password(&new_password).await?;
        submit(&page).await?;

        logout_via_settings(&ctx).await?;
        log_back_in(&ctx, &user.email, &new_password).await
    }
    .await;

    let form = SettingsForm {
        password: &user.password,
        ..Default::default()
    };
    restoring(outcome, restore(&ctx, &user.email, &new_password, form)).await
}

async fn empty_password(ctx: ScenarioContext) -> E2eResult<()> {
    let user = go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::PASSWORD_INPUT).await?;
    submit(&page).await?;

    logout_via_settings(&ctx).await?;
    log_back_in(&ctx, &user.email, &user.password).await
}

async fn whitespace_password(ctx: ScenarioContext, password: &'static str) -> E2eResult<()> {
    let user = go_to_settings(&ctx, "fullDataUser").await?;
    let page = ctx.settings();
    let outcome: E2eResult<()> = async {
        page.clear_field(&settings_loc::PASSWORD_INPUT).await?;
        page.enter_password(password).await?;
        page.click_update_button().await?;

        let messages = page.error_messages().await?;
        check!(
            any_message_contains(&messages, WHITESPACE_PASSWORD_ERRORS),
            "password {:?} accepted without a whitespace error, got {:?}",
            password,
            messages
        );
        Ok(())
    }
    .await;

    match outcome {
        Ok(()) => Ok(()),
        // The app may have saved the whitespace password
        Err(e) => {
            let form = SettingsForm {
                password: &user.password,
                ..Default::default()
            };
            restoring(Err(e), restore(&ctx, &user.email, password, form)).await
        }
    }
}

async fn prefilled_form(ctx: ScenarioContext) -> E2eResult<()> {
    let user = login_as(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.navigate().await?;
    check!(page.is_settings_page_loaded().await?, "settings page did not load");

    let username = populated_value(&page, &settings_loc::USERNAME_INPUT).await?;
    check!(username == user.username, "username field shows {:?}", username);
    let email = populated_value(&page, &settings_loc::EMAIL_INPUT).await?;
    check!(email == user.email, "email field shows {:?}", email);
    let password = page.field_value(&settings_loc::PASSWORD_INPUT).await?;
    check!(password.is_empty(), "password field is pre-filled");
    Ok(())
}
