//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests for tutor chat and
//! video status lookups. It uses `utoipa` doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument, warn};
use tutor_core::{tutor::TutorResponse, video::VideoError};

use crate::{
    models::{ChatRequest, ChatResponse, ErrorResponse, VideoStatusQuery, VideoStatusResponse},
    state::AppState,
};

pub const LIVENESS_MESSAGE: &str = "Avatar tutor backend is running. Try POST /api/chat.";

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    NotConfigured(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::NotConfigured(message) => {
                warn!("Request needs missing configuration: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", err))
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::InternalServerError(err.into())
    }
}

impl ApiError {
    fn from_video(err: VideoError) -> Self {
        match err {
            VideoError::NotConfigured(message) => Self::NotConfigured(message.to_string()),
            other => Self::from(other),
        }
    }
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "The service is running", body = String, content_type = "text/plain")
    )
)]
pub async fn index() -> &'static str {
    LIVENESS_MESSAGE
}

/// Ask the tutor a question and receive a structured reply, plus an avatar
/// video request when HeyGen is configured.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Tutor reply with the HeyGen response attached", body = ChatResponse),
        (status = 400, description = "Missing message or unreadable body", body = ErrorResponse),
        (status = 500, description = "LLM or video provider failure", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TutorResponse>, ApiError> {
    // The body is read as JSON whatever its content type.
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("request body is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(ApiError::BadRequest(
            "request body must be a JSON object".to_string(),
        ));
    }
    let request = ChatRequest::deserialize(value)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {}", e)))?;

    let message = request
        .message()
        .ok_or_else(|| ApiError::BadRequest("message is required".to_string()))?;

    let response = state
        .tutor
        .respond(message, &request.user_language())
        .await?;
    Ok(Json(response))
}

/// Look up the status of a HeyGen video.
#[utoipa::path(
    get,
    path = "/api/video_status",
    params(VideoStatusQuery),
    responses(
        (status = 200, description = "Reshaped HeyGen video status", body = VideoStatusResponse),
        (status = 400, description = "video_id is missing", body = ErrorResponse),
        (status = 500, description = "HeyGen is not configured or returned an error", body = ErrorResponse)
    )
)]
#[instrument(skip_all, fields(video_id))]
pub async fn video_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VideoStatusQuery>,
) -> Result<Json<VideoStatusResponse>, ApiError> {
    let video_id = query
        .video_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("video_id is required".to_string()))?;
    tracing::Span::current().record("video_id", video_id.as_str());

    let status = state
        .video
        .video_status(&video_id)
        .await
        .map_err(ApiError::from_video)?;

    Ok(Json(status.into()))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
