use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::operation::Operation;
use crate::response::classify;
use crate::rpc::{call, Endpoint, RpcResult};
use crate::transport::{HttpTransport, Transport};
use crate::tx::TxSuite;
use crate::value::encode;
use crate::Result;

/// The client of a Scalaris store.
///
/// Holds only the node address and the transport, so one client can be
/// shared by many threads. Every method issues exactly one HTTP request
/// and returns the raw response once it classifies as a success.
#[derive(Debug, Clone)]
pub struct ScalarisClient<T: Transport = HttpTransport> {
    address: String,
    transport: T,
}

impl ScalarisClient<HttpTransport> {
    /// Creates a client for the node at `address` (`host:port`) with the
    /// default timeout.
    pub fn new(address: impl Into<String>) -> Self {
        Self::from_config(&ClientConfig::default().with_address(address))
    }

    /// Creates a client from a configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config.address.clone(), HttpTransport::new(config.timeout))
    }
}

impl<T: Transport> ScalarisClient<T> {
    /// Creates a client sending its requests through `transport`.
    pub fn with_transport(address: impl Into<String>, transport: T) -> Self {
        Self {
            address: address.into(),
            transport,
        }
    }

    /// The node address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Reads a key outside of any transaction.
    pub fn read(&self, key: impl Into<String>) -> Result<RpcResult> {
        self.invoke(Endpoint::Tx, "read", vec![Value::String(key.into())])
    }

    /// Writes a key outside of any transaction.
    pub fn write(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<RpcResult> {
        let params = vec![Value::String(key.into()), json!(encode(value))];
        self.invoke(Endpoint::Tx, "write", params)
    }

    /// Test-and-set outside of any transaction.
    ///
    /// This is the store's single-call `test_and_set` method; use
    /// [`tx_test_and_set`](Self::tx_test_and_set) for the transactional form.
    pub fn test_and_set(
        &self,
        key: impl Into<String>,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Result<RpcResult> {
        let params = vec![
            Value::String(key.into()),
            json!(encode(old)),
            json!(encode(new)),
        ];
        self.invoke(Endpoint::Tx, "test_and_set", params)
    }

    /// Deletes a key from every replica.
    pub fn delete(&self, key: impl Into<String>) -> Result<RpcResult> {
        let op = Operation::delete(key);
        self.invoke(Endpoint::Rdht, "delete", vec![op.to_descriptor()])
    }

    /// Reads a key inside a transaction.
    pub fn tx_read(&self, key: impl Into<String>) -> Result<RpcResult> {
        self.submit(&TxSuite::read(key))
    }

    /// Writes a key inside a transaction.
    pub fn tx_write(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<RpcResult> {
        self.submit(&TxSuite::write(key, value))
    }

    /// Test-and-set inside a transaction.
    pub fn tx_test_and_set(
        &self,
        key: impl Into<String>,
        old: impl Into<Value>,
        new: impl Into<Value>,
    ) -> Result<RpcResult> {
        self.submit(&TxSuite::test_and_set(key, old, new))
    }

    /// Runs `ops` as one transaction, closed by a commit marker.
    pub fn tx_suite(&self, ops: impl IntoIterator<Item = Operation>) -> Result<RpcResult> {
        self.submit(&TxSuite::compose(ops))
    }

    /// Submits an already composed transaction.
    pub fn submit(&self, suite: &TxSuite) -> Result<RpcResult> {
        let params = vec![Value::Array(suite.to_descriptors())];
        self.invoke(Endpoint::Tx, "req_list", params)
    }

    fn invoke(&self, endpoint: Endpoint, method: &str, params: Vec<Value>) -> Result<RpcResult> {
        let url = endpoint.url(&self.address);
        let result = call(&self.transport, &url, method, params)?;
        classify(&result)?;
        Ok(result)
    }
}
