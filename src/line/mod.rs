use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::bot::BotApp;
use crate::core::error::BotResult;
use crate::core::shared::state::AppState;
use crate::security::{verify_signature, SIGNATURE_HEADER};

#[derive(Debug, Deserialize, Serialize)]
pub struct LineWebhook {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub events: Vec<LineEvent>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub source: LineSource,
    #[serde(default)]
    pub message: Option<LineMessage>,
    #[serde(default)]
    pub postback: Option<LinePostback>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSource {
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LinePostback {
    pub data: String,
}

/// What the bot does with one webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Recognize { message_id: String, reply_token: String },
    Propose { query: String, reply_token: String },
    Feedback { data: String, reply_token: String },
    Register { user_id: String },
}

impl LineEvent {
    /// Only one-to-one chats with a user are handled; everything else maps to `None`.
    pub fn action(&self) -> Option<EventAction> {
        if self.source.source_type != "user" {
            return None;
        }

        match self.event_type.as_str() {
            "message" => {
                let reply_token = self.reply_token.clone()?;
                let message = self.message.as_ref()?;
                match message.message_type.as_str() {
                    "image" => Some(EventAction::Recognize {
                        message_id: message.id.clone(),
                        reply_token,
                    }),
                    "text" => {
                        let query = message.text.as_deref().map(str::trim).unwrap_or_default();
                        (!query.is_empty()).then(|| EventAction::Propose {
                            query: query.to_string(),
                            reply_token,
                        })
                    }
                    _ => None,
                }
            }
            "postback" => Some(EventAction::Feedback {
                data: self.postback.as_ref()?.data.clone(),
                reply_token: self.reply_token.clone()?,
            }),
            "follow" => Some(EventAction::Register {
                user_id: self.source.user_id.clone()?,
            }),
            _ => None,
        }
    }
}

pub fn configure(callback_path: &str) -> Router<Arc<AppState>> {
    Router::new().route(callback_path, post(handle_webhook))
}

pub async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let validation = verify_signature(&state.config.line.channel_secret, &body, signature);
    if !validation.is_valid() {
        warn!("Rejected LINE webhook: {}", validation.error_message());
        return (StatusCode::BAD_REQUEST, validation.error_message());
    }

    let webhook: LineWebhook = match serde_json::from_slice(&body) {
        Ok(webhook) => webhook,
        Err(e) => {
            warn!("Malformed LINE webhook body: {}", e);
            return (StatusCode::BAD_REQUEST, "Malformed body");
        }
    };
    info!("LINE webhook received with {} event(s)", webhook.events.len());

    for event in webhook.events {
        let Some(action) = event.action() else {
            debug!(
                "Ignoring {} event from {} source",
                event.event_type, event.source.source_type
            );
            continue;
        };

        let bot = state.bot.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatch(&bot, &action).await {
                error!("Failed to process LINE event {:?}: {}", action, e);
            }
        });
    }

    (StatusCode::OK, "OK")
}

async fn dispatch(bot: &BotApp, action: &EventAction) -> BotResult<()> {
    match action {
        EventAction::Recognize {
            message_id,
            reply_token,
        } => bot.send_recognized(message_id, reply_token).await,
        EventAction::Propose { query, reply_token } => bot.send_proposals(query, reply_token).await,
        EventAction::Feedback { data, reply_token } => bot.handle_postback(data, reply_token).await,
        EventAction::Register { user_id } => bot.register_follower(user_id).await,
    }
}
