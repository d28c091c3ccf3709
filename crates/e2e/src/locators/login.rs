//! Login page (`#/login`)

use crate::locator::Locator;

pub const EMAIL_INPUT: Locator = Locator::css(".auth-page input[type='email']");
pub const PASSWORD_INPUT: Locator = Locator::css(".auth-page input[type='password']");
pub const SIGN_IN_BUTTON: Locator = Locator::css(".auth-page button[type='submit']");
pub const ERROR_MESSAGES: Locator = Locator::css(".auth-page .error-messages li");
