//! API Models
//!
//! Request and response bodies of the HTTP API, annotated with `utoipa` for the
//! OpenAPI document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use tutor_core::{DEFAULT_USER_LANGUAGE, video::VideoStatus};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema, Debug)]
pub struct ChatRequest {
    #[schema(example = "How do I say 'good evening' in French?")]
    #[serde(default)]
    pub message: Option<String>,
    /// The learner's native language. Defaults to "en". Non-string values
    /// are written into the prompt as their JSON text.
    #[schema(value_type = Option<String>, example = "en")]
    #[serde(default)]
    pub user_language: Option<Value>,
}

impl ChatRequest {
    /// The message, or `None` if it is absent or empty.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }

    pub fn user_language(&self) -> Cow<'_, str> {
        match &self.user_language {
            None | Some(Value::Null) => Cow::Borrowed(DEFAULT_USER_LANGUAGE),
            Some(Value::String(language)) => Cow::Borrowed(language),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

/// Documents the body returned by `POST /api/chat`. The handler passes the
/// LLM's object through, so any extra keys it produced are kept as well.
#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    pub needs_visual: bool,
    #[schema(example = "sentence_pair")]
    pub visual_type: String,
    #[schema(value_type = Object)]
    pub visual_payload: Value,
    /// The HeyGen response, or null when video generation is not configured.
    #[schema(value_type = Option<Object>)]
    pub heygen_video: Option<Value>,
}

#[derive(Deserialize, IntoParams, Debug)]
#[into_params(parameter_in = Query)]
pub struct VideoStatusQuery {
    /// The HeyGen video id returned by a previous chat call.
    pub video_id: Option<String>,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
pub struct VideoStatusResponse {
    #[schema(example = "completed")]
    pub status: String,
    pub video_url: Option<String>,
    #[schema(value_type = Object)]
    pub raw: Value,
}

impl From<VideoStatus> for VideoStatusResponse {
    fn from(status: VideoStatus) -> Self {
        Self {
            status: status.status,
            video_url: status.video_url,
            raw: status.raw,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
