pub mod broadcast;
pub mod message;

pub use broadcast::{BroadcastHub, PublishReport, SubscriberHandle};
pub use message::{BroadcastMessage, ClientMessage, MessageKind};
