pub mod catalog;
pub mod orca;
pub mod profile;
pub mod pump_fun;
pub mod raydium;
pub mod synthetic;

use std::sync::Arc;
use async_trait::async_trait;
use crate::error::Result;
use crate::rpc::Connection;
use crate::store::TimeSeriesStore;
use crate::types::asset::{AssetUpdate, Platform, SecurityInfo};
use crate::types::timestamp::Timestamp;
use crate::sources::synthetic::Synthesizer;

/// What an adapter may touch during one cycle run.
pub struct SourceContext<'a> {
    pub connection: &'a Connection,
    pub store: &'a TimeSeriesStore,
    pub now: Timestamp,
}

/// One upstream platform, normalized into canonical asset updates.
///
/// Adapters may write history (price, volume, transactions) to the store but
/// never broadcast. A failing adapter must not affect its siblings.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn platform(&self) -> Platform;

    async fn fetch_assets(&self, ctx: &SourceContext<'_>) -> Result<Vec<AssetUpdate>>;

    async fn fetch_security_info(&self, ctx: &SourceContext<'_>, address: &str) -> Result<SecurityInfo>;
}

/// Registered adapters, queried in registration order.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raydium, pump.fun and Orca, all drawing from `synth`.
    pub fn with_platforms(synth: Synthesizer) -> Self {
        let mut registry = Self::new();
        registry
            .register(Arc::new(raydium::adapter(synth.clone())))
            .register(Arc::new(pump_fun::adapter(synth.clone())))
            .register(Arc::new(orca::adapter(synth)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) -> &mut Self {
        tracing::info!(platform = %adapter.platform(), "Registered source adapter");
        self.adapters.push(adapter);
        self
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn for_platform(&self, platform: Platform) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.platform() == platform)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
