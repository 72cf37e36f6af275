//! Request and response values threaded through the pipeline.
//!
//! # Design
//! A `Request` is an open mapping of named fields. The pipeline only ever
//! looks at `address`, so it lives in its own field and the rest stay in a
//! `serde_json::Map` that interceptors and transports interpret as they see
//! fit. The conventional fields (`method`, `headers`, `body`) get typed
//! accessors because both the bundled transport and the built-in
//! interceptors read them.
//!
//! `Response` is what `UreqTransport` resolves to. Its body is an enum so a
//! response interceptor can turn text into JSON without changing the type
//! flowing through the chain.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

const ADDRESS: &str = "address";
const METHOD: &str = "method";
const HEADERS: &str = "headers";
const BODY: &str = "body";

/// A request description: `address` plus any number of opaque fields.
///
/// Serializes as one flat JSON object, e.g.
/// `{"address": "some/url", "method": "POST", "body": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed for a pipeline call: `description` with its address replaced by
    /// `address`, whatever either of them holds.
    pub(crate) fn seeded(address: Option<&str>, description: Option<Request>) -> Self {
        let mut request = description.unwrap_or_default();
        request.address = address.map(str::to_owned);
        request
    }

    /// Build a request from a JSON object. Non-object values and non-string
    /// addresses are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::try_from(map),
            other => Err(Error::Deserialization(format!(
                "request description must be an object, got {other}"
            ))),
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        if let Some(address) = &self.address {
            map.insert(ADDRESS.to_string(), Value::String(address.clone()));
        }
        Value::Object(map)
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Look up a field other than `address`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, returning the previous value.
    ///
    /// `"address"` is routed to the address slot: a string sets it and
    /// `null` clears it. Any other address value is rejected with
    /// `Error::InvalidRequest` and the request is left unchanged.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>> {
        let key = key.into();
        let value = value.into();
        if key != ADDRESS {
            return Ok(self.fields.insert(key, value));
        }
        let address = match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => {
                return Err(Error::InvalidRequest(format!(
                    "address must be a string, got {other}"
                )))
            }
        };
        Ok(std::mem::replace(&mut self.address, address).map(Value::String))
    }

    /// Builder form of `insert`.
    ///
    /// # Panics
    ///
    /// Panics if `key` is `"address"` and `value` is neither a string nor
    /// `null`. Use `insert` when the value is not known to be valid.
    #[track_caller]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Err(e) = self.insert(key, value) {
            panic!("{e}");
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if key == ADDRESS {
            return self.address.take().map(Value::String);
        }
        self.fields.remove(key)
    }

    /// All fields except `address`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The `method` field, upper-cased. Defaults to `GET`.
    pub fn method(&self) -> String {
        self.fields
            .get(METHOD)
            .and_then(Value::as_str)
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| "GET".to_string())
    }

    /// The `headers` field as name/value pairs, in insertion order.
    ///
    /// Non-string header values are rendered as JSON text.
    pub fn headers(&self) -> Vec<(String, String)> {
        let Some(Value::Object(headers)) = self.fields.get(HEADERS) else {
            return Vec::new();
        };
        headers
            .iter()
            .map(|(name, value)| (name.clone(), render_header(value)))
            .collect()
    }

    /// Case-insensitive header lookup, rendered the same way as `headers`.
    pub fn header(&self, name: &str) -> Option<String> {
        let Some(Value::Object(headers)) = self.fields.get(HEADERS) else {
            return None;
        };
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| render_header(value))
    }

    /// Set a header, replacing any existing header with the same name
    /// regardless of case. A non-object `headers` field is replaced.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let entry = self
            .fields
            .entry(HEADERS)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(headers) = entry {
            headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
            headers.insert(name, Value::String(value.into()));
        }
    }

    pub fn body(&self) -> Option<&Value> {
        self.fields.get(BODY)
    }

    pub fn set_body(&mut self, body: impl Into<Value>) {
        self.fields.insert(BODY.to_string(), body.into());
    }

    pub fn take_body(&mut self) -> Option<Value> {
        self.fields.remove(BODY)
    }
}

fn render_header(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl TryFrom<Map<String, Value>> for Request {
    type Error = Error;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        let mut request = Request::new();
        for (key, value) in map {
            request.insert(key, value)?;
        }
        Ok(request)
    }
}

/// Response body as seen by response interceptors.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Text(String),
    /// A payload that is not valid UTF-8.
    Bytes(Vec<u8>),
    Json(Value),
}

impl Body {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Body rendered as text, for error messages.
    pub fn to_text(&self) -> String {
        match self {
            Body::Empty => String::new(),
            Body::Text(text) => text.clone(),
            Body::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Body::Json(value) => value.to_string(),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; the first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
