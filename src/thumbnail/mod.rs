//! Image endpoints referenced from carousel thumbnails.
//!
//! `/image` resolves a sealed message reference back to the photo the user sent; the
//! `srt`, `w` and `h` parameters describe the crop for the image proxy in front of
//! the bot and are validated here. `/thumbnail` proxies a face image from the
//! recognizer backend.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::debug;
use serde::Deserialize;
use std::sync::Arc;

use crate::core::error::{BotError, BotResult};
use crate::core::shared::state::AppState;
use crate::recognition::SrtParams;

const CACHE_CONTROL_VALUE: &str = "public, max-age=86400";

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub key: String,
    #[serde(default)]
    pub srt: Option<String>,
    #[serde(default)]
    pub w: Option<u32>,
    #[serde(default)]
    pub h: Option<u32>,
}

impl ImageQuery {
    /// Rejects crop parameters the image proxy could not render.
    pub fn validate_crop(&self) -> BotResult<Option<SrtParams>> {
        if self.w == Some(0) || self.h == Some(0) {
            return Err(BotError::Validation("output size must be positive".into()));
        }
        self.srt
            .as_deref()
            .map(|srt| {
                srt.parse::<SrtParams>()
                    .map_err(|e| BotError::Validation(format!("invalid srt: {e}")))
            })
            .transpose()
    }
}

#[derive(Debug, Deserialize)]
pub struct ThumbnailQuery {
    pub image_url: String,
    #[serde(default)]
    pub from: Option<String>,
}

pub fn configure() -> Router<Arc<AppState>> {
    Router::new()
        .route("/image", get(serve_image))
        .route("/thumbnail", get(serve_thumbnail))
}

pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, BotError> {
    let message_id = state.bot.codec().decode(&query.key)?;
    if let Some(crop) = query.validate_crop()? {
        debug!(
            "Image {} requested with crop centered at ({:.2}, {:.2})",
            message_id, crop.center_x, crop.center_y
        );
    }

    let content = state.bot.channel().fetch_content(&message_id).await?;
    Ok(image_response(content.content_type, content.data))
}

pub async fn serve_thumbnail(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Response, BotError> {
    if let Some(from) = query.from.as_deref() {
        debug!("Thumbnail for a photo from {}", from);
    }
    let (content_type, data) = state.bot.backend().fetch_image(&query.image_url).await?;
    Ok(image_response(content_type, data))
}

fn image_response(content_type: String, data: bytes::Bytes) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, CACHE_CONTROL_VALUE.to_string()),
        ],
        data,
    )
        .into_response()
}
