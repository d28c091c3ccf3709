//! Error types for E2E testing

use thiserror::Error;

/// W3C error codes that mean "the page has not caught up yet".
const TRANSIENT_ERRORS: &[&str] = &[
    "no such element",
    "stale element reference",
    "element not interactable",
    "element click intercepted",
];

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("WebDriver binary not found: {0}. Install chromedriver or pass --webdriver-url")]
    DriverNotFound(String),

    #[error("WebDriver failed to start: {0}")]
    DriverStartup(String),

    #[error("WebDriver status check failed after {0} attempts")]
    DriverHealthCheck(usize),

    #[error("WebDriver error [{error}]: {message}")]
    WebDriver { error: String, message: String },

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Fixture key not found in test data: {0}")]
    FixtureNotFound(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Unknown marker: {0} (expected data_required, data_not_required or data_required_below_ten_articles)")]
    UnknownMarker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl E2eError {
    /// Whether a poll or retry may succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            E2eError::WebDriver { error, .. } => TRANSIENT_ERRORS.contains(&error.as_str()),
            _ => false,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail the current scenario with a formatted message unless `cond` holds.
#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}
