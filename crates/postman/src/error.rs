//! Error types for the Postman tooling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostmanError {
    #[error("Required environment variable is not set: {0}")]
    MissingEnv(&'static str),

    #[error("Postman API returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Postman response has no `{0}` member")]
    MissingField(&'static str),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Newman report unreadable at {path}: {reason}")]
    Report { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type PostmanResult<T> = Result<T, PostmanError>;

/// Value of an environment-sourced setting, or [`PostmanError::MissingEnv`].
pub fn require<'a>(value: &'a Option<String>, var: &'static str) -> PostmanResult<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PostmanError::MissingEnv(var)),
    }
}
