//! Naming/RPC transport seam
//!
//! The browser consumes the distributed naming system through these two
//! traits and never touches the wire itself. Everything here is fallible
//! and asynchronous; independent calls have no ordering guarantee.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::signature::ServiceSignature;

/// One mount point reported by a glob stream. `name` is relative to the
/// name the glob was issued under; `servers` holds the endpoint addresses
/// serving it, empty for a pure intermediary node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub name: String,
    pub servers: Vec<String>,
}

impl MountEntry {
    pub fn new(name: impl Into<String>, servers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            servers,
        }
    }
}

/// One message on a running glob stream.
#[derive(Debug, Clone)]
pub enum GlobReply {
    Entry(MountEntry),
    /// Terminal stream failure. No further replies follow.
    Error(String),
}

/// A running glob call. Replies arrive in remote delivery order; the
/// channel closing without a [`GlobReply::Error`] means the stream
/// completed normally. The underlying call is not cancellable; dropping
/// the receiver only stops us from looking.
pub struct GlobCall {
    pub replies: mpsc::Receiver<GlobReply>,
}

impl GlobCall {
    pub fn new(replies: mpsc::Receiver<GlobReply>) -> Self {
        Self { replies }
    }
}

/// Entry point into the naming system: turn names into addresses and
/// addresses into live service handles.
#[async_trait]
pub trait NamingTransport: Send + Sync {
    /// Candidate addresses currently serving `name`. An empty list is a
    /// resolution failure and is reported as an error, not `Ok(vec![])`.
    async fn resolve(&self, name: &str) -> Result<Vec<String>>;

    /// Connect to one candidate address.
    async fn bind_to(&self, address: &str) -> Result<Arc<dyn ServiceHandle>>;
}

/// A bound connection to one remote service.
#[async_trait]
pub trait ServiceHandle: Send + Sync {
    /// Start a glob for `query` under this service's name.
    async fn glob(&self, query: &str) -> Result<GlobCall>;

    /// Fetch the service's interface signature.
    async fn signature(&self) -> Result<ServiceSignature>;

    /// Invoke `method` with positional `args`, returning the raw output
    /// values in declaration order.
    async fn invoke(&self, method: &str, args: Vec<Value>) -> Result<Vec<Value>>;
}
