//! Profile page (`#/@username`)

use crate::locator::Locator;

pub const PROFILE_PAGE: Locator = Locator::css(".profile-page");
pub const USERNAME: Locator = Locator::css(".user-info h4");
pub const BIO: Locator = Locator::css(".user-info p");
