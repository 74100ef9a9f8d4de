use serde::{Deserialize, Serialize};

use crate::recognition::Label;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub source_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceFace {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub photo: Photo,
}

/// A pending face/label association proposed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub label: Label,
    #[serde(default)]
    pub face: InferenceFace,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferencesResponse {
    #[serde(default)]
    pub inferences: Vec<Inference>,
}

/// Outcome of an accept/reject call. `result_url` is only sent for accepted inferences.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterUserRequest<'a> {
    pub screen_name: &'a str,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegisterUserResponse {
    #[serde(default)]
    pub authentication_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecognizeRequest {
    pub image: String,
}
