//! RealWorld Postman tooling
//!
//! Pulls the API test collection and its environment from the Postman API
//! and runs them through the Newman CLI, summarising the JSON report.

pub mod api;
pub mod error;
pub mod newman;

pub use api::{PostmanClient, DEFAULT_API_URL};
pub use error::{require, PostmanError, PostmanResult};
pub use newman::{NewmanOutcome, NewmanRun, NewmanSummary};
