//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, CORS headers, and OpenAPI documentation.

use crate::{
    handlers,
    models::{ChatRequest, ChatResponse, ErrorResponse, VideoStatusResponse},
    state::AppState,
};

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::index,
        handlers::chat,
        handlers::video_status,
    ),
    components(
        schemas(ChatRequest, ChatResponse, VideoStatusResponse, ErrorResponse)
    ),
    tags(
        (name = "Avatar Tutor API", description = "Language tutor replies with optional HeyGen avatar videos")
    )
)]
pub struct ApiDoc;

/// Every response allows any origin, the `Content-Type` request header and
/// the three methods the API serves. Any `OPTIONS` request is answered here
/// with an empty 200.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/", get(handlers::index))
        .route("/api/chat", post(handlers::chat))
        .route("/api/video_status", get(handlers::video_status))
        .with_state(app_state);

    // CorsLayer only sends the allow-headers/methods pair on preflights,
    // so they are added to every other response here.
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
        .fallback(handlers::not_found)
        .layer(cors_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("content-type"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,OPTIONS"),
        ))
}
