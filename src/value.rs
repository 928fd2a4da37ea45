use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transport marker carried next to every value sent to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// The value travels as plain JSON.
    AsIs,
    /// The value is a base64 string holding binary data.
    AsBin,
}

/// A value tagged for transport: `{"type": "as_is", "value": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedValue {
    /// How `value` is to be interpreted by the store.
    #[serde(rename = "type")]
    pub kind: ValueKind,
    /// The raw payload.
    pub value: Value,
}

impl EncodedValue {
    /// Tags an already base64-encoded string as binary data.
    ///
    /// The codec never picks `as_bin` on its own; callers that want the
    /// store to treat a value as bytes must ask for it here.
    pub fn binary(base64: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::AsBin,
            value: Value::String(base64.into()),
        }
    }
}

/// Tags an application value for transport.
///
/// Every value is sent `as_is`. Byte vectors become JSON arrays of
/// numbers, not base64 strings; callers that need the base64 form build it
/// themselves and pass it as a string, or use [`EncodedValue::binary`].
pub fn encode(value: impl Into<Value>) -> EncodedValue {
    EncodedValue {
        kind: ValueKind::AsIs,
        value: value.into(),
    }
}
