use std::time::Duration;
use thiserror::Error;
use crate::types::asset::Platform;
use crate::types::ids::SubscriberId;

#[derive(Error, Debug)]
pub enum Error {
    // Upstream Errors
    #[error("Endpoint unavailable: {endpoint}: {reason}")]
    EndpointUnavailable {
        endpoint: String,
        reason: String,
    },

    #[error("No healthy endpoint available")]
    NoHealthyEndpoint,

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    // Ingestion Errors
    #[error("Adapter fetch failed for {platform}: {reason}")]
    AdapterFetchFailed {
        platform: Platform,
        reason: String,
    },

    // Store Errors
    #[error("Invalid point for {address}: {reason}")]
    InvalidPoint {
        address: String,
        reason: String,
    },

    #[error("Invalid asset {address}: {reason}")]
    InvalidAsset {
        address: String,
        reason: String,
    },

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // Broadcast Errors
    #[error("Send to subscriber {id} failed: {reason}")]
    SubscriberSendFailed {
        id: SubscriberId,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // System Errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Whether the error points at the upstream endpoint rather than at our data.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::EndpointUnavailable { .. }
                | Error::NoHealthyEndpoint
                | Error::Timeout(_)
                | Error::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
