use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use crate::config::HubConfig;
use crate::error::{Error, Result};
use crate::hub::message::BroadcastMessage;
use crate::observability::metrics::{ACTIVE_SUBSCRIBERS, SUBSCRIBERS_DROPPED};
use crate::types::ids::SubscriberId;

/// Receiving end owned by one live subscriber.
pub struct SubscriberHandle {
    id: SubscriberId,
    receiver: mpsc::Receiver<Arc<str>>,
}

impl SubscriberHandle {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next serialized message. `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.receiver.try_recv().ok()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Fan-out of serialized snapshots to live subscribers.
///
/// Each subscriber owns a bounded queue. `publish` never waits: a full or
/// closed queue removes that subscriber on the spot. Publishing under the
/// registry lock keeps every subscriber's queue in publish order.
pub struct BroadcastHub {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<Arc<str>>>>,
    buffer: usize,
}

impl BroadcastHub {
    pub fn new(config: &HubConfig) -> Self {
        Self::with_buffer(config.subscriber_buffer)
    }

    pub fn with_buffer(buffer: usize) -> Self {
        BroadcastHub {
            subscribers: Mutex::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    pub fn subscribe(&self) -> SubscriberHandle {
        let (tx, receiver) = mpsc::channel(self.buffer);
        let id = SubscriberId::new();
        self.register(id, tx);
        SubscriberHandle { id, receiver }
    }

    /// Subscribes with `init` already queued ahead of any later publish.
    pub fn subscribe_with(&self, init: &BroadcastMessage) -> Result<SubscriberHandle> {
        let payload = encode(init)?;
        let (tx, receiver) = mpsc::channel(self.buffer);
        let id = SubscriberId::new();
        tx.try_send(payload).map_err(|e| Error::SubscriberSendFailed {
            id,
            reason: e.to_string(),
        })?;
        self.register(id, tx);
        Ok(SubscriberHandle { id, receiver })
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let removed = subscribers.remove(&id).is_some();
        ACTIVE_SUBSCRIBERS.set(subscribers.len() as i64);
        if removed {
            info!(subscriber = %id, "Subscriber left");
        }
        removed
    }

    pub fn publish(&self, message: &BroadcastMessage) -> Result<PublishReport> {
        let payload = encode(message)?;
        let mut report = PublishReport::default();

        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|id, tx| match tx.try_send(payload.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(e) => {
                let reason = match e {
                    TrySendError::Full(_) => "queue full",
                    TrySendError::Closed(_) => "disconnected",
                };
                let err = Error::SubscriberSendFailed { id: *id, reason: reason.to_string() };
                debug!("Dropping subscriber: {}", err);
                report.dropped += 1;
                false
            }
        });
        ACTIVE_SUBSCRIBERS.set(subscribers.len() as i64);
        SUBSCRIBERS_DROPPED.inc_by(report.dropped as u64);

        Ok(report)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn register(&self, id: SubscriberId, tx: mpsc::Sender<Arc<str>>) {
        let mut subscribers = self.subscribers.lock();
        subscribers.insert(id, tx);
        ACTIVE_SUBSCRIBERS.set(subscribers.len() as i64);
        info!(subscriber = %id, "Subscriber joined");
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(&HubConfig::default())
    }
}

fn encode(message: &BroadcastMessage) -> Result<Arc<str>> {
    serde_json::to_string(message)
        .map(Arc::from)
        .map_err(|e| Error::SerializationError(e.to_string()))
}
