use async_trait::async_trait;
use log::{error, info};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{MessageContent, MessengerChannel};
use crate::core::config::LineConfig;
use crate::core::error::{BotError, BotResult};
use crate::reply::OutboundMessage;

/// The messaging API accepts at most this many messages per reply.
const MAX_REPLY_MESSAGES: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LineReplyRequest<'a> {
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Debug, Deserialize)]
pub struct LineErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LineAdapter {
    http: reqwest::Client,
    channel_token: String,
    api_base: String,
    data_api_base: String,
}

impl LineAdapter {
    pub fn new(config: &LineConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            channel_token: config.channel_token.clone(),
            api_base: config.api_base.clone(),
            data_api_base: config.data_api_base.clone(),
        }
    }

    async fn check(response: reqwest::Response, what: &str) -> BotResult<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }
        let detail = response
            .json::<LineErrorResponse>()
            .await
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| "Unknown LINE API error".to_string());
        error!("LINE {} failed with {}: {}", what, status, detail);
        Err(BotError::Status(status.as_u16()))
    }
}

#[async_trait]
impl MessengerChannel for LineAdapter {
    async fn reply(&self, reply_token: &str, messages: Vec<OutboundMessage>) -> BotResult<()> {
        if messages.is_empty() {
            return Ok(());
        }
        if messages.len() > MAX_REPLY_MESSAGES {
            return Err(BotError::Validation(format!(
                "at most {MAX_REPLY_MESSAGES} messages per reply, got {}",
                messages.len()
            )));
        }

        let payload = LineReplyRequest {
            reply_token,
            messages: &messages,
        };
        let response = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(&self.channel_token)
            .json(&payload)
            .send()
            .await
            .map_err(BotError::from_request)?;
        Self::check(response, "reply").await?;

        info!("LINE reply sent with {} message(s)", messages.len());
        Ok(())
    }

    async fn fetch_content(&self, message_id: &str) -> BotResult<MessageContent> {
        if message_id.is_empty() || !message_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BotError::Validation(format!("invalid message id {message_id:?}")));
        }

        let response = self
            .http
            .get(format!(
                "{}/v2/bot/message/{}/content",
                self.data_api_base, message_id
            ))
            .bearer_auth(&self.channel_token)
            .send()
            .await
            .map_err(BotError::from_request)?;
        let response = Self::check(response, "content fetch").await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response.bytes().await.map_err(BotError::from_request)?;

        Ok(MessageContent { content_type, data })
    }
}
