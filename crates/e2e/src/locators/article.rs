//! Article page and its comment section

use crate::locator::Locator;

pub const ARTICLE_PAGE: Locator = Locator::css(".article-page");

pub const COMMENT_CONTAINER: Locator =
    Locator::css(".article-page .row > .col-xs-12.col-md-8.offset-md-2");
pub const COMMENT_INPUT: Locator = Locator::css("form.comment-form textarea");
pub const POST_COMMENT_BUTTON: Locator = Locator::css("form.comment-form button[type='submit']");
pub const COMMENT_CARDS: Locator = Locator::css(".article-page .card:not(.comment-form)");
pub const LAST_COMMENT_CARD: Locator = Locator::xpath(
    "(//div[contains(@class,'article-page')]//div[contains(@class,'card') and not(contains(@class,'comment-form'))])[last()]",
);

// Relative to a comment card
pub const COMMENT_TEXT: Locator = Locator::css(".card-block p.card-text");
pub const COMMENT_AUTHOR_IMAGE: Locator = Locator::css(".card-footer img.comment-author-img");
pub const COMMENT_AUTHOR: Locator = Locator::css(".card-footer a.comment-author:not(:has(img))");
pub const COMMENT_DATE: Locator = Locator::css(".card-footer .date-posted");
pub const COMMENT_DELETE: Locator = Locator::css(".card-footer .mod-options i.ion-trash-a");
