//! Signup, login and session scenarios (AUTH-AUTO-*)

use std::future::Future;
use std::time::Duration;

use tracing::info;

use crate::check;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::Credentials;
use crate::locators::{editor, home, login as login_loc, settings as settings_loc, signup as signup_loc};
use crate::pages::SignupPage;
use crate::scenario::{Marker, Scenario, ScenarioContext, Suite};
use crate::scenarios::{any_message_contains, go_to_settings, jwt, login_as, JWT_KEY};

const EXPIRED_TOKEN: &str = "expired_or_invalid_token";

fn auth<F, Fut>(id: &str, name: &str, marker: Marker, run: F) -> Scenario
where
    F: Fn(ScenarioContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    Scenario::new(id, name, Suite::Auth, marker, run)
}

pub fn scenarios() -> Vec<Scenario> {
    use Marker::*;
    vec![
        auth("AUTH-AUTO-001", "successful signup", DataNotRequired, successful_signup),
        auth("AUTH-AUTO-002", "signup with blank username", DataNotRequired, blank_username_signup),
        auth("AUTH-AUTO-003", "signup with blank email", DataNotRequired, blank_email_signup),
        auth("AUTH-AUTO-004", "signup with blank password", DataNotRequired, blank_password_signup),
        auth("AUTH-AUTO-005", "signup with invalid email", DataNotRequired, invalid_email_signup),
        auth("AUTH-AUTO-006", "signup with duplicate email", DataNotRequired, duplicate_email_signup),
        auth("AUTH-AUTO-007", "signup with duplicate username", DataNotRequired, duplicate_username_signup),
        auth("AUTH-AUTO-008", "signup with short password", DataNotRequired, short_password_signup),
        auth("AUTH-AUTO-009", "script tag in username is escaped", DataNotRequired, xss_username_signup),
        auth("AUTH-AUTO-010", "double-click on sign up", DataNotRequired, double_click_signup),
        auth("AUTH-AUTO-011", "successful login", DataRequired, successful_login),
        auth("AUTH-AUTO-012", "login with wrong password", DataRequired, wrong_password_login),
        auth("AUTH-AUTO-013", "login survives refresh", DataRequired, login_survives_refresh),
        auth("AUTH-AUTO-014", "login survives navigation", DataRequired, login_survives_navigation),
        auth("AUTH-AUTO-015", "logged-out editor redirects to login", DataNotRequired, editor_requires_login),
        auth("AUTH-AUTO-016", "logged-out settings redirects to login", DataNotRequired, settings_requires_login),
        auth("AUTH-AUTO-017", "logout", DataRequired, logout),
        auth("AUTH-AUTO-018", "settings after token removal", DataRequired, settings_after_token_removal),
        auth("AUTH-AUTO-019", "expired token", DataRequired, expired_token),
        auth("AUTH-AUTO-020", "signup placeholders", DataNotRequired, signup_placeholders),
        auth("AUTH-AUTO-021", "signup fields are labelled", DataNotRequired, signup_field_labels),
        auth("AUTH-AUTO-022", "signup with too long username", DataNotRequired, username_too_long),
        auth("AUTH-AUTO-023", "login placeholders", DataNotRequired, login_placeholders),
        auth("AUTH-AUTO-024", "settings placeholders", DataRequired, settings_placeholders),
        auth("AUTH-AUTO-025", "bio too long", DataRequired, bio_too_long),
        auth("AUTH-AUTO-026", "login visible in a second tab", DataRequired, multi_tab_login),
        auth("AUTH-AUTO-027", "logout visible in a second tab", DataRequired, multi_tab_logout),
        auth("AUTH-AUTO-028", "login with blank fields", DataNotRequired, blank_login),
        auth("AUTH-AUTO-029", "sign in button disabled while submitting", DataRequired, submit_loading_state),
    ]
}

/// Submit the signup form with fixture `key` and expect to stay on it
/// with one of `expected` among the error messages
async fn rejected_signup(ctx: &ScenarioContext, key: &str, expected: &[&str]) -> E2eResult<()> {
    let user = ctx.data().credentials(key)?;
    let page = ctx.signup();
    page.navigate().await?;
    page.signup(&user.username, &user.email, &user.password).await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, expected),
        "expected one of {:?}, got {:?}",
        expected,
        messages
    );
    let url = page.current_url().await?;
    check!(url.contains(SignupPage::ROUTE), "left the signup page: {}", url);
    Ok(())
}

async fn assert_logged_out_nav(ctx: &ScenarioContext) -> E2eResult<()> {
    let base = ctx.base();
    check!(base.is_element_visible(&home::NAV_SIGN_IN_LINK).await?, "Sign in link not shown");
    check!(base.is_element_visible(&home::NAV_SIGN_UP_LINK).await?, "Sign up link not shown");
    Ok(())
}

fn is_blank_token(token: &Option<String>) -> bool {
    matches!(token.as_deref(), None | Some("") | Some("null"))
}

async fn successful_signup(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("successSignup")?;
    let page = ctx.signup();
    page.navigate().await?;
    page.signup(&user.username, &user.email, &user.password).await?;
    check!(page.is_signup_successful().await?, "signup did not redirect home");

    let home = ctx.home();
    let shown = home.navigate_user_name().await?;
    check!(shown == user.username, "nav shows {:?}, expected {:?}", shown, user.username);
    for (link, label) in [
        (&home::NAV_NEW_POST_LINK, "New Post"),
        (&home::NAV_SETTINGS_LINK, "Settings"),
        (&home::NAV_USER_LINK, "user"),
    ] {
        check!(home.is_element_visible(link).await?, "{} link not shown", label);
    }
    check!(home.is_element_hidden(&home::NAV_SIGN_IN_LINK).await?, "Sign in link still shown");
    check!(home.is_element_hidden(&home::NAV_SIGN_UP_LINK).await?, "Sign up link still shown");
    Ok(())
}

async fn blank_username_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "noUserNameSignup", &["username can't be blank"]).await
}

async fn blank_email_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "noEmailSignup", &["email can't be blank"]).await
}

async fn blank_password_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "noPasswordSignup", &["password can't be blank"]).await
}

async fn invalid_email_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "invalidEmailSignup", &["email is invalid"]).await
}

async fn duplicate_email_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "duplicateEmailSignup", &["email has already been taken"]).await
}

async fn duplicate_username_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "existingUsernameSignup", &["username has already been taken"]).await
}

async fn short_password_signup(ctx: ScenarioContext) -> E2eResult<()> {
    rejected_signup(&ctx, "shortPwSignup", &["password is too short", "minimum is 6 characters"]).await
}

async fn xss_username_signup(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("xssSignup")?;
    let page = ctx.signup();
    page.navigate().await?;
    page.signup(&user.username, &user.email, &user.password).await?;
    check!(page.is_signup_successful().await?, "signup with script username failed");

    let home = ctx.home();
    check!(home.is_page_loaded().await?, "home page did not load");
    // Rendered as text, so the tag shows up literally
    let shown = home.navigate_user_name().await?;
    check!(
        shown.contains("<script>") || shown.contains("&lt;script&gt;"),
        "username was not rendered as text: {:?}",
        shown
    );
    Ok(())
}

async fn double_click_signup(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("doubleClickSignin")?;
    let page = ctx.signup();
    page.navigate().await?;
    page.enter_username(&user.username).await?;
    page.enter_email(&user.email).await?;
    page.enter_password(&user.password).await?;
    let button = page.wait().clickable(&signup_loc::SIGN_UP_BUTTON).await?;
    ctx.browser().double_click(&button).await?;

    check!(page.is_signup_successful().await?, "double-clicked signup failed");
    check!(ctx.home().is_page_loaded().await?, "home page did not load");
    check!(ctx.login().is_logged_in().await?, "not logged in after double-click signup");
    Ok(())
}

async fn successful_login(ctx: ScenarioContext) -> E2eResult<()> {
    let user = login_as(&ctx, "successLogin").await?;
    let home = ctx.home();
    check!(home.wait_for_url_contains("/").await?, "no redirect after login");
    let shown = home.navigate_user_name().await?;
    check!(shown == user.username, "nav shows {:?}, expected {:?}", shown, user.username);
    let token = jwt(&ctx).await?;
    check!(!is_blank_token(&token), "no JWT in localStorage after login");
    Ok(())
}

async fn wrong_password_login(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("wrongPwLogin")?;
    let page = ctx.login();
    page.navigate().await?;
    page.remove_local_storage_item(JWT_KEY).await?;
    let initial_url = page.current_url().await?;

    page.enter_email(&user.email).await?;
    page.enter_password(&user.password).await?;
    page.click_sign_in().await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["email or password is invalid"]),
        "expected invalid credentials message, got {:?}",
        messages
    );
    let url = page.current_url().await?;
    check!(url == initial_url, "URL changed from {} to {}", initial_url, url);
    let token = jwt(&ctx).await?;
    check!(matches!(token.as_deref(), None | Some("")), "JWT stored after failed login");
    Ok(())
}

async fn login_survives_refresh(ctx: ScenarioContext) -> E2eResult<()> {
    login_as(&ctx, "successLogin").await?;
    let home = ctx.home();
    let name_before = home.navigate_user_name().await?;
    let token_before = jwt(&ctx).await?;

    ctx.browser().refresh().await?;
    check!(home.is_page_loaded().await?, "home page did not load after refresh");
    let name_after = home.navigate_user_name().await?;
    check!(name_after == name_before, "nav user changed: {:?} -> {:?}", name_before, name_after);
    let token_after = jwt(&ctx).await?;
    check!(token_after == token_before, "JWT changed across refresh");
    check!(!is_blank_token(&token_after), "JWT lost after refresh");
    Ok(())
}

async fn login_survives_navigation(ctx: ScenarioContext) -> E2eResult<()> {
    login_as(&ctx, "successLogin").await?;
    let home = ctx.home();
    let name = home.navigate_user_name().await?;
    let token = jwt(&ctx).await?;

    home.click(&home::NAV_SETTINGS_LINK).await?;
    check!(ctx.settings().is_settings_page_loaded().await?, "settings page did not load");
    check!(home.navigate_user_name().await? == name, "nav user changed on settings page");
    check!(jwt(&ctx).await? == token, "JWT changed on settings page");

    home.click(&home::NAV_HOME_LINK).await?;
    check!(home.is_page_loaded().await?, "home page did not load on return");
    check!(home.navigate_user_name().await? == name, "nav user changed on return home");
    let final_token = jwt(&ctx).await?;
    check!(final_token == token, "JWT changed on return home");
    check!(!is_blank_token(&final_token), "JWT lost on return home");
    Ok(())
}

async fn editor_requires_login(ctx: ScenarioContext) -> E2eResult<()> {
    let base = ctx.base();
    base.remove_local_storage_item(JWT_KEY).await?;
    base.open("editor").await?;
    check!(
        base.wait_for_url_contains("/login").await?,
        "not redirected to login: {}",
        base.current_url().await?
    );
    check!(
        !base.is_element_present(&editor::PUBLISH_BUTTON).await?,
        "editor form shown while logged out"
    );
    Ok(())
}

async fn settings_requires_login(ctx: ScenarioContext) -> E2eResult<()> {
    let base = ctx.base();
    base.remove_local_storage_item(JWT_KEY).await?;
    base.open("settings").await?;
    check!(
        base.wait_for_url_contains("login").await?,
        "not redirected to login: {}",
        base.current_url().await?
    );
    check!(
        !base.is_element_present(&settings_loc::UPDATE_BUTTON).await?,
        "settings form shown while logged out"
    );
    Ok(())
}

async fn logout(ctx: ScenarioContext) -> E2eResult<()> {
    login_as(&ctx, "successLogin").await?;
    let home = ctx.home();
    check!(home.is_element_visible(&home::NAV_USER_LINK).await?, "not logged in");

    home.click(&home::NAV_SETTINGS_LINK).await?;
    ctx.settings().click_logout_button().await?;
    check!(home.is_page_loaded().await?, "home page did not load after logout");

    let url = home.current_url().await?;
    check!(url.ends_with('/') || url.ends_with("#/"), "not on the home route: {}", url);
    assert_logged_out_nav(&ctx).await?;
    check!(
        !home.is_element_present(&home::NAV_USER_LINK).await?,
        "user link still present after logout"
    );
    check!(is_blank_token(&jwt(&ctx).await?), "JWT kept after logout");
    Ok(())
}

async fn settings_after_token_removal(ctx: ScenarioContext) -> E2eResult<()> {
    login_as(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.navigate().await?;
    check!(page.is_settings_page_loaded().await?, "settings page did not load");

    page.remove_local_storage_item(JWT_KEY).await?;
    // Reload so the app re-reads localStorage
    ctx.browser().refresh().await?;
    page.navigate().await?;
    check!(
        page.wait_for_url_contains("login").await?,
        "not redirected to login: {}",
        page.current_url().await?
    );
    check!(
        !page.is_element_present(&settings_loc::UPDATE_BUTTON).await?,
        "settings form still shown"
    );
    Ok(())
}

async fn expired_token(ctx: ScenarioContext) -> E2eResult<()> {
    login_as(&ctx, "successLogin").await?;
    let base = ctx.base();
    check!(base.is_element_visible(&home::NAV_USER_LINK).await?, "not logged in");

    base.set_local_storage_item(JWT_KEY, EXPIRED_TOKEN).await?;
    ctx.browser().refresh().await?;
    base.open("settings").await?;
    check!(
        base.wait_for_url_contains("login").await?,
        "not redirected to login: {}",
        base.current_url().await?
    );
    let token = jwt(&ctx).await?;
    check!(token.as_deref() != Some(EXPIRED_TOKEN), "expired token kept in localStorage");
    Ok(())
}

async fn signup_placeholders(ctx: ScenarioContext) -> E2eResult<()> {
    let page = ctx.signup();
    page.navigate().await?;
    for (locator, expected) in [
        (&signup_loc::USERNAME_INPUT, "Username"),
        (&signup_loc::EMAIL_INPUT, "Email"),
        (&signup_loc::PASSWORD_INPUT, "Password"),
    ] {
        let placeholder = page.attribute(locator, "placeholder").await?.unwrap_or_default();
        check!(placeholder == expected, "placeholder {:?}, expected {:?}", placeholder, expected);
    }
    Ok(())
}

/// Each input carries an accessible name, via `aria-label` or its placeholder
async fn signup_field_labels(ctx: ScenarioContext) -> E2eResult<()> {
    let page = ctx.signup();
    page.navigate().await?;
    for (locator, field) in [
        (&signup_loc::USERNAME_INPUT, "username"),
        (&signup_loc::EMAIL_INPUT, "email"),
        (&signup_loc::PASSWORD_INPUT, "password"),
    ] {
        if !page.is_element_present(locator).await? {
            info!("No {} field on the signup form", field);
            continue;
        }
        let mut label = page.attribute(locator, "aria-label").await?.unwrap_or_default();
        if label.trim().is_empty() {
            label = page.attribute(locator, "placeholder").await?.unwrap_or_default();
        }
        check!(!label.trim().is_empty(), "{} field has no label", field);
    }
    Ok(())
}

async fn username_too_long(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("longUsernameSignup")?;
    let page = ctx.signup();
    page.navigate().await?;
    let url = page.current_url().await?;
    page.signup(&user.username, &user.email, &user.password).await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["username is too long", "maximum"]),
        "no username length error, got {:?}",
        messages
    );
    check!(page.current_url().await? == url, "URL changed after rejected signup");
    Ok(())
}

async fn login_placeholders(ctx: ScenarioContext) -> E2eResult<()> {
    let page = ctx.login();
    page.navigate().await?;
    for (locator, field) in [(&login_loc::EMAIL_INPUT, "email"), (&login_loc::PASSWORD_INPUT, "password")] {
        let placeholder = page.attribute(locator, "placeholder").await?.unwrap_or_default();
        check!(!placeholder.is_empty(), "{} placeholder is empty", field);
    }
    Ok(())
}

async fn settings_placeholders(ctx: ScenarioContext) -> E2eResult<()> {
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    for (locator, field) in [
        (&settings_loc::BIO_TEXTAREA, "bio"),
        (&settings_loc::PROFILE_PICTURE_INPUT, "image URL"),
        (&settings_loc::USERNAME_INPUT, "username"),
        (&settings_loc::EMAIL_INPUT, "email"),
        (&settings_loc::PASSWORD_INPUT, "password"),
    ] {
        let placeholder = page.attribute(locator, "placeholder").await?.unwrap_or_default();
        check!(!placeholder.is_empty(), "{} placeholder is empty", field);
    }
    Ok(())
}

async fn bio_too_long(ctx: ScenarioContext) -> E2eResult<()> {
    let long_bio = ctx.data().credentials("bioLongText")?.long_bio.unwrap_or_default();
    go_to_settings(&ctx, "successLogin").await?;
    let page = ctx.settings();
    page.clear_field(&settings_loc::BIO_TEXTAREA).await?;
    page.enter_bio(&long_bio).await?;
    page.click_update_button().await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["bio is too long", "maximum"]),
        "no bio length error, got {:?}",
        messages
    );
    Ok(())
}

/// Log in, open a second tab on the home page and switch to it
async fn second_tab(ctx: &ScenarioContext, user: &Credentials) -> E2eResult<(String, String)> {
    let browser = ctx.browser();
    let original = browser.window_handle().await?;
    let tab = browser.new_window().await?;
    browser.switch_to_window(&tab).await?;
    ctx.home().navigate().await?;

    let shown = ctx.home().navigate_user_name().await?;
    check!(shown == user.username, "second tab shows {:?}, expected {:?}", shown, user.username);
    Ok((original, tab))
}

async fn multi_tab_login(ctx: ScenarioContext) -> E2eResult<()> {
    let user = login_as(&ctx, "successLogin").await?;
    let (original, _tab) = second_tab(&ctx, &user).await?;
    ctx.browser().close_window().await?;
    ctx.browser().switch_to_window(&original).await
}

async fn multi_tab_logout(ctx: ScenarioContext) -> E2eResult<()> {
    let user = login_as(&ctx, "successLogin").await?;
    let (original, tab) = second_tab(&ctx, &user).await?;
    let browser = ctx.browser();

    browser.switch_to_window(&original).await?;
    ctx.home().click(&home::NAV_SETTINGS_LINK).await?;
    ctx.settings().click_logout_button().await?;

    browser.switch_to_window(&tab).await?;
    browser.refresh().await?;
    assert_logged_out_nav(&ctx).await
}

async fn blank_login(ctx: ScenarioContext) -> E2eResult<()> {
    let page = ctx.login();
    page.navigate().await?;
    page.click_sign_in().await?;

    let messages = page.error_messages().await?;
    check!(
        any_message_contains(&messages, &["can't be blank"]),
        "expected a blank field error, got {:?}",
        messages
    );
    let url = page.current_url().await?;
    check!(url.contains("login"), "left the login page: {}", url);
    Ok(())
}

async fn submit_loading_state(ctx: ScenarioContext) -> E2eResult<()> {
    let user = ctx.data().credentials("successLogin")?;
    let page = ctx.login();
    page.navigate().await?;
    page.enter_email(&user.email).await?;
    page.enter_password(&user.password).await?;
    page.click_sign_in().await?;

    let disabled = match page
        .wait()
        .with_timeout(Duration::from_secs(3))
        .attribute_equals(&login_loc::SIGN_IN_BUTTON, "disabled", "true")
        .await
    {
        Ok(()) => true,
        Err(E2eError::Timeout(_)) => false,
        Err(e) => return Err(e),
    };
    check!(disabled, "sign in button was not disabled during submission");
    Ok(())
}
