//! Postman REST API client
//!
//! Downloads a collection or an environment by UID and stores it as
//! pretty-printed JSON that Newman can read.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{PostmanError, PostmanResult};

pub const DEFAULT_API_URL: &str = "https://api.getpostman.com";

pub struct PostmanClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PostmanClient {
    pub fn new(api_key: &str) -> PostmanResult<Self> {
        Self::with_base_url(DEFAULT_API_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: &str) -> PostmanResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json(&self, path: &str) -> PostmanResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).header("X-Api-Key", &self.api_key).send().await?;

        let status = response.status();
        info!("GET {} -> {}", path, status.as_u16());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PostmanError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let document: Value = response.json().await?;
        if let Some(map) = document.as_object() {
            debug!("Response keys: {:?}", map.keys().collect::<Vec<_>>());
        }
        Ok(document)
    }

    /// The `collection` member of `GET /collections/{uid}`
    pub async fn collection(&self, uid: &str) -> PostmanResult<Value> {
        let mut document = self.get_json(&format!("/collections/{}", uid)).await?;
        document
            .get_mut("collection")
            .map(Value::take)
            .ok_or(PostmanError::MissingField("collection"))
    }

    /// `GET /environments/{uid}` with disabled variables removed
    pub async fn environment(&self, uid: &str) -> PostmanResult<Value> {
        let mut document = self.get_json(&format!("/environments/{}", uid)).await?;
        let removed = retain_enabled(&mut document)?;
        if removed > 0 {
            info!("Dropped {} disabled environment variables", removed);
        }
        Ok(document)
    }

    pub async fn fetch_collection(&self, uid: &str, output: &Path) -> PostmanResult<PathBuf> {
        info!("Fetching collection {}", uid);
        let collection = self.collection(uid).await?;
        write_json(output, &collection)?;
        info!("Collection saved to {}", output.display());
        Ok(output.to_path_buf())
    }

    pub async fn fetch_environment(&self, uid: &str, output: &Path) -> PostmanResult<PathBuf> {
        info!("Fetching environment {}", uid);
        let environment = self.environment(uid).await?;
        write_json(output, &environment)?;
        info!("Environment saved to {}", output.display());
        Ok(output.to_path_buf())
    }
}

/// Keep only `environment.values` entries whose `enabled` is `true`.
/// Returns how many entries were dropped.
pub fn retain_enabled(document: &mut Value) -> PostmanResult<usize> {
    let values = document
        .get_mut("environment")
        .and_then(|env| env.get_mut("values"))
        .and_then(Value::as_array_mut)
        .ok_or(PostmanError::MissingField("environment.values"))?;

    let before = values.len();
    values.retain(|v| v.get("enabled").and_then(Value::as_bool) == Some(true));
    Ok(before - values.len())
}

/// Pretty-print `value` to `path`, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> PostmanResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retain_enabled() {
        let mut doc = json!({
            "environment": {
                "name": "Conduit",
                "values": [
                    { "key": "baseUrl", "value": "http://localhost:3000", "enabled": true },
                    { "key": "token", "value": "", "enabled": false },
                    { "key": "legacy", "value": "x" }
                ]
            }
        });
        assert_eq!(retain_enabled(&mut doc).unwrap(), 2);
        assert_eq!(doc["environment"]["values"], json!([
            { "key": "baseUrl", "value": "http://localhost:3000", "enabled": true }
        ]));
        assert_eq!(doc["environment"]["name"], "Conduit");
    }

    #[test]
    fn test_retain_enabled_requires_values() {
        let mut doc = json!({ "environment": { "name": "empty" } });
        assert!(matches!(
            retain_enabled(&mut doc),
            Err(PostmanError::MissingField("environment.values"))
        ));
    }

    #[test]
    fn test_write_json_keeps_unicode() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/collection.json");
        write_json(&path, &json!({ "name": "로컬 환경" })).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("로컬 환경"));
        assert!(content.contains("\n  \"name\""));
    }
}
