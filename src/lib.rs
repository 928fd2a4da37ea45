#![deny(missing_docs)]

//! A client library for the Scalaris transactional key-value store.
//!
//! Requests travel as JSON-RPC over HTTP. Single reads and writes,
//! test-and-set, deletes and multi-operation transactions are built from
//! typed [`Operation`]s, sent through a [`Transport`], and every answer is
//! classified into a success or a [`ScalarisError`].

mod client;
mod config;
mod error;
mod operation;
mod response;
mod rpc;
mod transport;
mod tx;
mod value;

pub use client::ScalarisClient;
pub use config::{ClientConfig, DEFAULT_ADDRESS, DEFAULT_TIMEOUT, ENDPOINT_ENV};
pub use error::{Result, ScalarisError};
pub use operation::Operation;
pub use response::{classify, Outcome};
pub use rpc::{call, Endpoint, RpcRequest, RpcResult, RPC_ID};
pub use transport::{HttpResponse, HttpTransport, Transport};
pub use tx::TxSuite;
pub use value::{encode, EncodedValue, ValueKind};
