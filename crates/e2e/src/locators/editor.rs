//! Editor page (`#/editor`)

use crate::locator::Locator;

pub const PUBLISH_BUTTON: Locator = Locator::css(".editor-page button.btn-primary");
