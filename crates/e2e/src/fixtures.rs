//! Test data fixtures
//!
//! Scenario inputs live in `data/test_data.json`, a single object keyed by
//! fixture name. Values are either account records, plain strings, or lists
//! of strings. The token `{run_id}` inside any string is replaced with a
//! per-run identifier so signup scenarios can register fresh accounts on
//! every run.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// An account record (`successLogin`, `fullDataUser`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default, alias = "userName")]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub new_bio: Option<String>,
    #[serde(default)]
    pub long_bio: Option<String>,
}

pub const RUN_ID_TOKEN: &str = "{run_id}";

/// Parsed fixture file
#[derive(Debug, Clone, Default)]
pub struct TestData {
    entries: Map<String, Value>,
    run_id: String,
}

impl TestData {
    pub fn load(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            E2eError::Fixture(format!("cannot read {}: {}", path.display(), e))
        })?;
        let data = Self::from_json(&content)?;
        debug!("Loaded {} fixtures from {}", data.entries.len(), path.display());
        Ok(data)
    }

    /// Accepts a keyed object, or a list of single-key objects
    pub fn from_json(content: &str) -> E2eResult<Self> {
        let entries = match serde_json::from_str::<Value>(content)? {
            Value::Object(map) => map,
            Value::Array(items) => {
                let mut map = Map::new();
                for item in items {
                    match item {
                        Value::Object(entry) => {
                            // First object holding a key wins
                            for (key, value) in entry {
                                map.entry(key).or_insert(value);
                            }
                        }
                        other => {
                            return Err(E2eError::Fixture(format!(
                                "fixture list items must be objects, got {}",
                                other
                            )))
                        }
                    }
                }
                map
            }
            other => {
                return Err(E2eError::Fixture(format!(
                    "fixture file must be an object, got {}",
                    other
                )))
            }
        };
        Ok(Self {
            entries,
            run_id: String::new(),
        })
    }

    /// Substitute `id` for every `{run_id}` token
    pub fn with_run_id(mut self, id: impl Into<String>) -> Self {
        self.run_id = id.into();
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> E2eResult<T> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| E2eError::FixtureNotFound(key.to_string()))?;
        serde_json::from_value(substitute(value.clone(), &self.run_id))
            .map_err(|e| E2eError::Fixture(format!("{}: {}", key, e)))
    }

    pub fn credentials(&self, key: &str) -> E2eResult<Credentials> {
        self.get(key)
    }

    pub fn text(&self, key: &str) -> E2eResult<String> {
        self.get(key)
    }

    pub fn texts(&self, key: &str) -> E2eResult<Vec<String>> {
        self.get(key)
    }
}

fn substitute(value: Value, run_id: &str) -> Value {
    match value {
        Value::String(s) if s.contains(RUN_ID_TOKEN) => Value::String(s.replace(RUN_ID_TOKEN, run_id)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| substitute(v, run_id)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, substitute(v, run_id)))
                .collect(),
        ),
        other => other,
    }
}
