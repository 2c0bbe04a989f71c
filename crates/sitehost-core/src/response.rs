//! Normalized API reply envelope
//!
//! Every SiteHost endpoint answers with a JSON object of the shape
//! `{"status": ..., "msg": ..., "return": ...}`, but the field types vary
//! between endpoints (and between success and failure). [`Response`] coerces
//! that object into a fixed `status` / `message` / `data` triple.
//!
//! Anything that prevents a usable reply from being decoded (a transport
//! error, a non-200 status, a body that is not a JSON object) produces the
//! same invalid envelope, see [`Response::from_http`].

use serde::Serialize;
use serde_json::{Map, Value};

/// The only HTTP status the API uses for a readable reply
const HTTP_OK: u16 = 200;

/// A decoded API reply
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    status: bool,
    #[serde(rename = "msg")]
    message: String,
    #[serde(rename = "return")]
    data: Map<String, Value>,
}

impl Response {
    /// Build an envelope from a decoded reply
    ///
    /// `None`, or anything that is not a JSON object, yields the invalid
    /// envelope: `status = false`, empty message, empty data.
    pub fn from_raw(raw: Option<&Value>) -> Self {
        let Some(Value::Object(obj)) = raw else {
            return Self::invalid();
        };

        Self {
            status: obj.get("status").is_some_and(is_truthy),
            message: obj.get("msg").map(to_text).unwrap_or_default(),
            data: obj.get("return").map(to_map).unwrap_or_default(),
        }
    }

    /// Build an envelope from an HTTP status code and a raw body
    ///
    /// Non-200 statuses, bodies that fail to parse as JSON and JSON that is not
    /// an object all collapse into the invalid envelope. Callers can not tell
    /// these cases apart, only that the reply is unusable.
    pub fn from_http(status: u16, body: &[u8]) -> Self {
        if status != HTTP_OK {
            return Self::invalid();
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_raw(Some(&value)),
            Err(_) => Self::invalid(),
        }
    }

    /// The envelope used for every failed request
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Whether the server reported success *and* returned data
    ///
    /// This is the predicate every downstream check relies on. A reply with a
    /// truthy status but an empty `return` section is not valid.
    pub fn is_valid(&self) -> bool {
        self.status && !self.data.is_empty()
    }

    /// Look up a single item of the returned data
    ///
    /// Returns `None` when there is no data, the key is blank, or the key is
    /// absent. A present JSON `null` is returned as `Some(&Value::Null)`.
    pub fn data_item(&self, key: &str) -> Option<&Value> {
        if self.data.is_empty() || key.trim().is_empty() {
            return None;
        }
        self.data.get(key)
    }

    /// Convenience over [`data_item`](Self::data_item) for string items
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data_item(key).and_then(Value::as_str)
    }

    pub fn status(&self) -> bool {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Loose truthiness of a JSON scalar, as the API mixes `true`, `1` and `"1"`
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Coerce the `return` section into a map
///
/// Lists are keyed by position and scalars land under `"0"`, so a job list or
/// a bare id still count as returned data.
fn to_map(value: &Value) -> Map<String, Value> {
    match value {
        Value::Null => Map::new(),
        Value::Object(obj) => obj.clone(),
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .map(|(idx, item)| (idx.to_string(), item.clone()))
            .collect(),
        scalar => Map::from_iter([("0".to_string(), scalar.clone())]),
    }
}
