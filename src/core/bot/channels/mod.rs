pub mod line;

use async_trait::async_trait;
use bytes::Bytes;

use crate::core::error::BotResult;
use crate::reply::OutboundMessage;

/// Binary message content as stored by the messenger platform.
#[derive(Debug, Clone)]
pub struct MessageContent {
    pub content_type: String,
    pub data: Bytes,
}

#[async_trait]
pub trait MessengerChannel: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> BotResult<()>;

    async fn fetch_content(&self, message_id: &str) -> BotResult<MessageContent>;
}
