//! Signup page (`#/register`)

use crate::locator::Locator;

pub const USERNAME_INPUT: Locator = Locator::css(".auth-page input[type='text']");
pub const EMAIL_INPUT: Locator = Locator::css(".auth-page input[type='email']");
pub const PASSWORD_INPUT: Locator = Locator::css(".auth-page input[type='password']");
pub const SIGN_UP_BUTTON: Locator = Locator::css(".auth-page button[type='submit']");
pub const ERROR_MESSAGES: Locator = Locator::css(".auth-page .error-messages li");
