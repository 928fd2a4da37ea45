use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::response::classify;
use crate::transport::Transport;
use crate::value::EncodedValue;
use crate::{Result, ScalarisError};

/// Request id sent with every call. The store treats it as a protocol
/// marker, not as a correlation id.
pub const RPC_ID: u64 = 0;

const CONTENT_TYPE: &str = "application/json";

/// HTTP endpoints exposed by a store node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Transactional API: `read`, `write`, `test_and_set`, `req_list`.
    Tx,
    /// Replicated DHT API: `delete`.
    Rdht,
    /// Raw DHT access.
    DhtRaw,
    /// Publish/subscribe API.
    PubSub,
    /// Node monitoring.
    Monitor,
}

impl Endpoint {
    /// Path of this endpoint relative to the node address.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Tx => "/api/tx.yaws",
            Endpoint::Rdht => "/api/rdht.yaws",
            Endpoint::DhtRaw => "/api/dht_raw.yaws",
            Endpoint::PubSub => "/api/pubsub.yaws",
            Endpoint::Monitor => "/api/monitor.yaws",
        }
    }

    /// Full URL of this endpoint on the node at `address` (`host:port`).
    pub fn url(self, address: &str) -> String {
        format!("http://{}{}", address, self.path())
    }
}

/// A JSON-RPC request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Method name, e.g. `req_list`.
    pub method: String,
    /// Request id, always [`RPC_ID`] when built by this crate.
    pub id: u64,
    /// Positional parameters.
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Builds an envelope for `method` with the fixed request id.
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            id: RPC_ID,
            params,
        }
    }
}

/// The decoded body of a store response.
///
/// Holds the JSON object exactly as it came back. [`classify`] decides
/// whether it is a success.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RpcResult(Map<String, Value>);

impl RpcResult {
    /// Wraps a decoded JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        RpcResult(map)
    }

    /// Looks up a top-level member.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `status` string, looked up at the top level and then inside `result`.
    pub fn status(&self) -> Option<&str> {
        self.nested_str("status")
    }

    /// The `reason` string, looked up at the top level and then inside `result`.
    pub fn reason(&self) -> Option<&str> {
        self.nested_str("reason")
    }

    /// The success payload, or `None` when the response is not a success
    /// or carries no payload.
    pub fn payload(&self) -> Option<Value> {
        classify(self).ok().flatten()
    }

    /// The success payload decoded as a tagged value.
    pub fn encoded_value(&self) -> Option<EncodedValue> {
        self.payload()
            .and_then(|payload| serde_json::from_value(payload).ok())
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the result, returning the JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    fn nested_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .or_else(|| self.0.get("result").and_then(|result| result.get(key)))
            .and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for RpcResult {
    fn from(map: Map<String, Value>) -> Self {
        RpcResult(map)
    }
}

impl fmt::Display for RpcResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// Sends `method(params)` to `url` and decodes the answer.
///
/// The status inside the answer is not interpreted here.
pub fn call<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    method: &str,
    params: Vec<Value>,
) -> Result<RpcResult> {
    let request = RpcRequest::new(method, params);
    let body = serde_json::to_vec(&request)?;
    debug!(
        "Built request for {}: {}",
        url,
        String::from_utf8_lossy(&body)
    );

    let response = transport.post(url, CONTENT_TYPE, &body)?;
    debug!(
        "Received {} from {}: {}",
        response.status,
        url,
        String::from_utf8_lossy(&response.body)
    );

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(map)) => {
            if !response.is_success() {
                warn!(
                    "HTTP status {} from {}, classifying the body anyway",
                    response.status, url
                );
            }
            Ok(RpcResult(map))
        }
        Ok(_) | Err(_) if !response.is_success() => Err(ScalarisError::Connection(format!(
            "HTTP status {}",
            response.status
        ))),
        Ok(other) => Err(ScalarisError::Unknown(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(e.into()),
    }
}
