//! Home page and navigation bar

use crate::locator::Locator;

pub const HOME_PAGE: Locator = Locator::css(".home-page");
pub const LOGO: Locator = Locator::css("a.navbar-brand");

// Navigation bar (logged in)
pub const NAV_HOME_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and normalize-space(.)='Home']");
pub const NAV_NEW_POST_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and contains(normalize-space(.),'New Post')]");
pub const NAV_SETTINGS_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and contains(normalize-space(.),'Settings')]");
pub const NAV_USER_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and contains(@href,'@')]");
pub const NAV_USER_PIC: Locator = Locator::css("nav img.user-pic");

// Navigation bar (logged out)
pub const NAV_SIGN_IN_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and normalize-space(.)='Sign in']");
pub const NAV_SIGN_UP_LINK: Locator =
    Locator::xpath("//nav//a[contains(@class,'nav-link') and normalize-space(.)='Sign up']");

// Feed
pub const GLOBAL_FEED_TAB: Locator =
    Locator::xpath("//div[contains(@class,'feed-toggle')]//a[contains(normalize-space(.),'Global Feed')]");
pub const ARTICLE_PREVIEW: Locator = Locator::css(".article-preview a.preview-link");
pub const ARTICLE_TITLES: Locator = Locator::css(".article-preview a.preview-link h1");
