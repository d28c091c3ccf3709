//! Element locators: a selector strategy plus a selector string

use std::fmt;

/// Selector strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum By {
    Css,
    XPath,
    Id,
    Name,
    ClassName,
    LinkText,
    PartialLinkText,
    TagName,
}

impl By {
    fn as_str(&self) -> &'static str {
        match self {
            By::Css => "css",
            By::XPath => "xpath",
            By::Id => "id",
            By::Name => "name",
            By::ClassName => "class name",
            By::LinkText => "link text",
            By::PartialLinkText => "partial link text",
            By::TagName => "tag name",
        }
    }
}

/// A (strategy, selector) pair identifying a DOM element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    pub by: By,
    pub selector: &'static str,
}

impl Locator {
    pub const fn new(by: By, selector: &'static str) -> Self {
        Self { by, selector }
    }

    pub const fn css(selector: &'static str) -> Self {
        Self::new(By::Css, selector)
    }

    pub const fn xpath(selector: &'static str) -> Self {
        Self::new(By::XPath, selector)
    }

    pub const fn id(selector: &'static str) -> Self {
        Self::new(By::Id, selector)
    }

    pub const fn name(selector: &'static str) -> Self {
        Self::new(By::Name, selector)
    }

    pub const fn class_name(selector: &'static str) -> Self {
        Self::new(By::ClassName, selector)
    }

    pub const fn link_text(selector: &'static str) -> Self {
        Self::new(By::LinkText, selector)
    }

    pub const fn partial_link_text(selector: &'static str) -> Self {
        Self::new(By::PartialLinkText, selector)
    }

    pub const fn tag_name(selector: &'static str) -> Self {
        Self::new(By::TagName, selector)
    }

    /// The `(using, value)` pair sent in a W3C find-element request.
    ///
    /// W3C only accepts css, xpath, link text and tag name strategies, so id,
    /// name and class lookups are rewritten as CSS selectors.
    pub fn to_w3c(&self) -> (&'static str, String) {
        match self.by {
            By::Css => ("css selector", self.selector.to_string()),
            By::XPath => ("xpath", self.selector.to_string()),
            By::LinkText => ("link text", self.selector.to_string()),
            By::PartialLinkText => ("partial link text", self.selector.to_string()),
            By::TagName => ("tag name", self.selector.to_string()),
            By::Id => ("css selector", format!("[id=\"{}\"]", escape_css(self.selector))),
            By::Name => ("css selector", format!("[name=\"{}\"]", escape_css(self.selector))),
            By::ClassName => ("css selector", format!("[class~=\"{}\"]", escape_css(self.selector))),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by.as_str(), self.selector)
    }
}

fn escape_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
