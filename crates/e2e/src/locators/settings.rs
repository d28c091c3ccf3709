//! Settings page (`#/settings`)

use crate::locator::Locator;

pub const SETTINGS_PAGE: Locator = Locator::css(".settings-page");
pub const TITLE: Locator = Locator::css(".settings-page h1");
pub const PROFILE_PICTURE_INPUT: Locator =
    Locator::css(".settings-page form fieldset > fieldset:nth-of-type(1) input");
pub const USERNAME_INPUT: Locator =
    Locator::css(".settings-page form fieldset > fieldset:nth-of-type(2) input");
pub const BIO_TEXTAREA: Locator = Locator::css(".settings-page form textarea");
pub const EMAIL_INPUT: Locator = Locator::css(".settings-page form input[type='email']");
pub const PASSWORD_INPUT: Locator = Locator::css(".settings-page form input[type='password']");
pub const UPDATE_BUTTON: Locator = Locator::css(".settings-page form button[type='submit']");
pub const LOGOUT_BUTTON: Locator = Locator::css(".settings-page button.btn-outline-danger");
pub const ERROR_MESSAGES: Locator = Locator::css(".settings-page .error-messages li");
