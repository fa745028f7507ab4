pub mod client;
pub mod pool;

use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use crate::error::Result;

pub use client::HttpRpcClient;
pub use pool::{ConnectionPool, EndpointHealth};

/// Capability of one upstream endpoint. Latency and availability are untrusted,
/// callers wrap every call in a timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Cheap read-only liveness call.
    async fn probe(&self) -> Result<()>;

    /// Whether an on-chain account exists and holds a non-zero balance.
    async fn account_exists(&self, address: &str) -> Result<bool>;
}

/// A handle to one endpoint, handed out by the pool for the duration of a cycle.
#[derive(Clone)]
pub struct Connection {
    endpoint: Arc<str>,
    client: Arc<dyn UpstreamClient>,
}

impl Connection {
    pub fn new(endpoint: impl Into<String>, client: Arc<dyn UpstreamClient>) -> Self {
        Connection {
            endpoint: Arc::from(endpoint.into()),
            client,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn probe(&self) -> Result<()> {
        self.client.probe().await
    }

    pub async fn account_exists(&self, address: &str) -> Result<bool> {
        self.client.account_exists(address).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
