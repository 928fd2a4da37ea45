use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::value::{encode, EncodedValue};

/// A single store operation.
///
/// Operations only describe a request; nothing is sent until they are
/// handed to a [`ScalarisClient`](crate::ScalarisClient).
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Read the value stored under a key.
    Read {
        /// The key to read.
        key: String,
    },
    /// Store a value under a key.
    Write {
        /// The key to write.
        key: String,
        /// The encoded value.
        value: EncodedValue,
    },
    /// Replace the value under a key only if it still equals `old`.
    TestAndSet {
        /// The key to update.
        key: String,
        /// The value the key must currently hold.
        old: EncodedValue,
        /// The value to store.
        new: EncodedValue,
    },
    /// Delete a key. Only valid against the replicated DHT endpoint.
    Delete {
        /// The key to delete.
        key: String,
    },
    /// Terminates a transaction.
    Commit,
}

impl Operation {
    /// Builds a read of `key`.
    pub fn read(key: impl Into<String>) -> Self {
        Operation::Read {
            key: checked_key(key),
        }
    }

    /// Builds a write of `value` under `key`.
    pub fn write(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Write {
            key: checked_key(key),
            value: encode(value),
        }
    }

    /// Builds a test-and-set of `key` from `old` to `new`.
    pub fn test_and_set(
        key: impl Into<String>,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Self {
        Operation::TestAndSet {
            key: checked_key(key),
            old: encode(old),
            new: encode(new),
        }
    }

    /// Builds a delete of `key`.
    pub fn delete(key: impl Into<String>) -> Self {
        Operation::Delete {
            key: checked_key(key),
        }
    }

    /// The commit marker.
    pub fn commit() -> Self {
        Operation::Commit
    }

    /// Returns `true` for the commit marker.
    pub fn is_commit(&self) -> bool {
        matches!(self, Operation::Commit)
    }

    /// Returns the wire descriptor of this operation.
    pub fn to_descriptor(&self) -> Value {
        match self {
            Operation::Read { key } => json!({ "read": key }),
            Operation::Write { key, value } => {
                let mut inner = Map::new();
                inner.insert(key.clone(), encoded(value));
                json!({ "write": inner })
            }
            Operation::TestAndSet { key, old, new } => json!({
                "test_and_set": {
                    "key": key,
                    "old": encoded(old),
                    "new": encoded(new),
                }
            }),
            Operation::Delete { key } => json!({ "key": key }),
            Operation::Commit => json!({ "commit": "" }),
        }
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_descriptor().serialize(serializer)
    }
}

fn checked_key(key: impl Into<String>) -> String {
    let key = key.into();
    debug_assert!(!key.is_empty(), "operation key must not be empty");
    key
}

fn encoded(value: &EncodedValue) -> Value {
    json!({ "type": value.kind, "value": value.value })
}
