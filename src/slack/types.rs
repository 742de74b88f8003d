use crate::lookup::InboundMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadTs(pub String);

impl ThreadTs {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTs(pub String);

impl MessageTs {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A channel message as delivered by the Events API
#[derive(Debug, Clone)]
pub struct SlackMessage {
    pub channel: ChannelId,
    pub text: String,
    pub thread_ts: Option<ThreadTs>,
    pub ts: MessageTs,
    pub sender_is_bot: bool,
    pub subtype: Option<String>,
}

impl SlackMessage {
    /// Key used to drop redelivered events
    pub fn event_key(&self) -> String {
        format!("message:{}:{}", self.channel.as_str(), self.ts.as_str())
    }

    pub fn to_inbound(&self) -> InboundMessage {
        InboundMessage {
            text: self.text.clone(),
            sender_is_bot: self.sender_is_bot,
            subtype: self.subtype.clone(),
        }
    }
}
