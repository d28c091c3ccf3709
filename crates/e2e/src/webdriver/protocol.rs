//! W3C WebDriver wire format

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::E2eError;
use crate::locator::Locator;
use crate::webdriver::ElementRef;

/// JSON key identifying a web element reference
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Body of every WebDriver response
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub value: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

/// Turn a response body into its `value`, mapping W3C error payloads.
pub fn unwrap_value(status_ok: bool, body: &str) -> Result<Value, E2eError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| {
        E2eError::Protocol(format!("malformed response ({}): {}", e, truncate(body, 200)))
    })?;

    if !status_ok {
        if let Ok(err) = serde_json::from_value::<ErrorValue>(envelope.value) {
            return Err(E2eError::WebDriver {
                error: err.error,
                message: err.message,
            });
        }
        return Err(E2eError::Protocol(format!(
            "request failed without an error payload: {}",
            truncate(body, 200)
        )));
    }

    Ok(envelope.value)
}

pub fn find_body(locator: &Locator) -> Value {
    let (using, value) = locator.to_w3c();
    json!({ "using": using, "value": value })
}

pub fn element_json(element: &ElementRef) -> Value {
    let mut map = Map::new();
    map.insert(ELEMENT_KEY.to_string(), Value::String(element.0.clone()));
    Value::Object(map)
}

pub fn parse_element(value: &Value) -> Result<ElementRef, E2eError> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(|id| ElementRef(id.to_string()))
        .ok_or_else(|| E2eError::Protocol(format!("not an element reference: {}", value)))
}

pub fn parse_elements(value: &Value) -> Result<Vec<ElementRef>, E2eError> {
    value
        .as_array()
        .ok_or_else(|| E2eError::Protocol(format!("expected element array, got {}", value)))?
        .iter()
        .map(parse_element)
        .collect()
}

/// Pointer action sequence for a left-button double click on `element`.
pub fn double_click_actions(element: &ElementRef) -> Value {
    json!({
        "actions": [{
            "type": "pointer",
            "id": "mouse",
            "parameters": { "pointerType": "mouse" },
            "actions": [
                { "type": "pointerMove", "origin": element_json(element), "x": 0, "y": 0 },
                { "type": "pointerDown", "button": 0 },
                { "type": "pointerUp", "button": 0 },
                { "type": "pointerDown", "button": 0 },
                { "type": "pointerUp", "button": 0 }
            ]
        }]
    })
}

/// Local `no such element` error for an empty find result.
pub fn no_such_element(locator: &Locator) -> E2eError {
    E2eError::WebDriver {
        error: "no such element".to_string(),
        message: format!("Unable to locate element: {}", locator),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
