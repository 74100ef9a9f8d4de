//! HTTP client for the face recognition and inference-management backend.

pub mod types;

pub use types::{ActionResponse, Inference, InferenceFace, Photo};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use log::{debug, info, warn};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::core::config::RecognizerConfig;
use crate::core::error::{BotError, BotResult};
use crate::recognition::{Label, RecognitionResult};
use types::{InferencesResponse, RecognizeRequest, RegisterUserRequest, RegisterUserResponse};

const EMAIL_HEADER: &str = "X-User-Email";
const TOKEN_HEADER: &str = "X-User-Token";
const MIN_INFERENCE_SCORE: &str = "0.5";

/// Backend operations the bot pipeline depends on.
#[async_trait]
pub trait RecognitionBackend: Send + Sync {
    async fn recognize_faces(&self, content_type: &str, image: &[u8]) -> BotResult<RecognitionResult>;

    /// Registers a messenger user and returns the backend authentication token.
    async fn register_user(&self, user_id: &str, display_name: &str) -> BotResult<String>;

    async fn labels(&self, query: &str) -> BotResult<Vec<Label>>;

    async fn inferences(&self, label_ids: &[u32]) -> BotResult<Vec<Inference>>;

    async fn accept_inference(&self, inference_id: u64) -> BotResult<ActionResponse>;

    async fn reject_inference(&self, inference_id: u64) -> BotResult<ActionResponse>;

    /// Fetches an image served by the backend. Returns its content type and bytes.
    async fn fetch_image(&self, image_url: &str) -> BotResult<(String, Bytes)>;
}

#[derive(Debug, Clone)]
pub struct RecognizerClient {
    http: reqwest::Client,
    endpoint: String,
    email: String,
    token: String,
}

impl RecognizerClient {
    pub fn new(config: &RecognizerConfig) -> BotResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_credentials(
            http,
            &config.endpoint,
            &config.admin_email,
            &config.admin_token,
        ))
    }

    pub fn with_credentials(http: reqwest::Client, endpoint: &str, email: &str, token: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            email: email.to_string(),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// True if `url` lives on the backend's scheme, host and port.
    pub fn owns_url(&self, url: &str) -> bool {
        let (Ok(base), Ok(candidate)) = (Url::parse(&self.endpoint), Url::parse(url)) else {
            return false;
        };
        candidate.host_str().is_some()
            && candidate.username().is_empty()
            && candidate.password().is_none()
            && base.scheme() == candidate.scheme()
            && base.host_str() == candidate.host_str()
            && base.port_or_known_default() == candidate.port_or_known_default()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn send(&self, request: RequestBuilder) -> BotResult<reqwest::Response> {
        let response = request
            .header(EMAIL_HEADER, &self.email)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(BotError::from_request)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("Recognizer API returned {} for {}", status, response.url().path());
            return Err(BotError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> BotResult<T> {
        let body = self
            .send(request)
            .await?
            .bytes()
            .await
            .map_err(BotError::from_request)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn inference_action(&self, inference_id: u64, action: &str) -> BotResult<ActionResponse> {
        let path = format!("inferences/{inference_id}/{action}.json");
        let response: ActionResponse = self.send_json(self.http.post(self.url(&path))).await?;
        if !response.success {
            return Err(BotError::BackendFailure(format!("{action} failed")));
        }
        Ok(response)
    }
}

#[async_trait]
impl RecognitionBackend for RecognizerClient {
    async fn recognize_faces(&self, content_type: &str, image: &[u8]) -> BotResult<RecognitionResult> {
        let request = RecognizeRequest {
            image: format!("data:{};base64,{}", content_type, BASE64.encode(image)),
        };
        let result: RecognitionResult = self
            .send_json(self.http.post(self.url("recognize.json")).json(&request))
            .await?;
        debug!("Recognizer returned {} faces", result.faces.len());
        Ok(result)
    }

    async fn register_user(&self, user_id: &str, display_name: &str) -> BotResult<String> {
        let request = RegisterUserRequest {
            screen_name: display_name,
            email: format!("{user_id}@line.me"),
        };
        let response: RegisterUserResponse = self
            .send_json(self.http.post(self.url("users.json")).json(&request))
            .await?;

        info!("Registered recognizer user for {}", user_id);
        response
            .authentication_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BotError::BackendFailure("registration returned no token".into()))
    }

    async fn labels(&self, query: &str) -> BotResult<Vec<Label>> {
        self.send_json(self.http.get(self.url("labels.json")).query(&[("q", query)]))
            .await
    }

    async fn inferences(&self, label_ids: &[u32]) -> BotResult<Vec<Inference>> {
        let mut params = vec![("min_score", MIN_INFERENCE_SCORE.to_string())];
        params.extend(label_ids.iter().map(|id| ("label_id[]", id.to_string())));

        let response: InferencesResponse = self
            .send_json(self.http.get(self.url("inferences.json")).query(&params))
            .await?;
        Ok(response.inferences)
    }

    async fn accept_inference(&self, inference_id: u64) -> BotResult<ActionResponse> {
        self.inference_action(inference_id, "accept").await
    }

    async fn reject_inference(&self, inference_id: u64) -> BotResult<ActionResponse> {
        self.inference_action(inference_id, "reject").await
    }

    async fn fetch_image(&self, image_url: &str) -> BotResult<(String, Bytes)> {
        if !self.owns_url(image_url) {
            return Err(BotError::Validation("image_url is not served by the recognizer".into()));
        }
        let response = self.send(self.http.get(image_url)).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = response.bytes().await.map_err(BotError::from_request)?;
        Ok((content_type, body))
    }
}
