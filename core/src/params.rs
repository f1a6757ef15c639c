//! Request parameters.
//!
//! `Params` is an ordered JSON object that operations validate before
//! serializing: each operation names the keys it requires and a missing key
//! fails locally with `ApiError::MissingParameter`. `NewPush` is a typed way
//! to build the parameters for `create_push`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::types::PushType;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert any serializable value; fails if it cannot be represented as JSON.
    pub fn try_with<T: Serialize>(mut self, key: impl Into<String>, value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        self.0.insert(key.into(), value);
        Ok(self)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn require(&self, operation: &'static str, field: &'static str) -> Result<&Value> {
        self.0
            .get(field)
            .ok_or(ApiError::MissingParameter { operation, field })
    }

    pub(crate) fn require_all(&self, operation: &'static str, fields: &[&'static str]) -> Result<()> {
        for field in fields {
            self.require(operation, field)?;
        }
        Ok(())
    }

    /// Remove a required key and render it as a URL segment or query value.
    pub(crate) fn take_text(&mut self, operation: &'static str, field: &'static str) -> Result<String> {
        self.require(operation, field)?;
        Ok(self.0.remove(field).map(as_text).unwrap_or_default())
    }

    pub(crate) fn text(&self, operation: &'static str, field: &'static str) -> Result<String> {
        self.require(operation, field).map(|v| as_text(v.clone()))
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.0).map_err(|e| ApiError::SerializationError(e.to_string()))
    }
}

fn as_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed push payload. Required fields are constructor arguments; targeting
/// is optional and defaults to all of the user's devices.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPush {
    kind: PushType,
    fields: Params,
}

impl NewPush {
    pub fn note(title: &str, body: &str) -> Self {
        Self::new(PushType::Note)
            .field("title", title)
            .field("body", body)
    }

    pub fn link(title: &str, link: &str) -> Self {
        Self::new(PushType::Link)
            .field("title", title)
            .field("link", link)
    }

    pub fn address(name: &str, address: &str) -> Self {
        Self::new(PushType::Address)
            .field("name", name)
            .field("address", address)
    }

    pub fn list<I, S>(title: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<Value> = items.into_iter().map(|s| Value::String(s.into())).collect();
        Self::new(PushType::List)
            .field("title", title)
            .field("items", items)
    }

    /// A file push. `path` is the local file uploaded before the push is sent.
    pub fn file(path: &str, file_name: &str, file_type: &str) -> Self {
        Self::new(PushType::File)
            .field("file_path", path)
            .field("file_name", file_name)
            .field("file_type", file_type)
    }

    fn new(kind: PushType) -> Self {
        Self {
            kind,
            fields: Params::new().with("type", kind.as_str()),
        }
    }

    fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key, value);
        self
    }

    pub fn kind(&self) -> PushType {
        self.kind
    }

    /// Body text; meaningful for every type except address.
    pub fn body(self, body: &str) -> Self {
        self.field("body", body)
    }

    pub fn target_device(self, device_iden: &str) -> Self {
        self.field("device_iden", device_iden)
    }

    pub fn target_email(self, email: &str) -> Self {
        self.field("email", email)
    }

    pub fn target_channel(self, channel_tag: &str) -> Self {
        self.field("channel_tag", channel_tag)
    }
}

impl From<NewPush> for Params {
    fn from(push: NewPush) -> Self {
        push.fields
    }
}
