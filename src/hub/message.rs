use serde::{Deserialize, Serialize};
use crate::store::Snapshot;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Init,
    TokenUpdate,
}

/// Envelope pushed to every subscriber.
#[derive(Clone, Debug, Serialize)]
pub struct BroadcastMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: Snapshot,
    pub timestamp: Timestamp,
}

impl BroadcastMessage {
    pub fn init(data: Snapshot) -> Self {
        Self::new(MessageKind::Init, data)
    }

    pub fn token_update(data: Snapshot) -> Self {
        Self::new(MessageKind::TokenUpdate, data)
    }

    fn new(kind: MessageKind, data: Snapshot) -> Self {
        BroadcastMessage {
            kind,
            data,
            timestamp: Timestamp::now(),
        }
    }
}

/// Inbound messages from a realtime client.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SubscribeToken { address: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::stats::StoreStats;

    #[test]
    fn envelope_wire_shape() {
        let msg = BroadcastMessage::token_update(Snapshot {
            assets: Vec::new(),
            stats: StoreStats {
                total_tokens: 0,
                new_tokens_24h: 0,
                volume_24h: "0".to_string(),
            },
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "token_update");
        assert_eq!(json["data"]["assets"], serde_json::json!([]));
        assert_eq!(json["data"]["stats"]["totalTokens"], 0);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn parses_subscription_intent() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"subscribe_token","address":"abc"}"#).unwrap();
        assert_eq!(msg, ClientMessage::SubscribeToken { address: "abc".to_string() });
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"unknown"}"#).is_err());
    }
}
