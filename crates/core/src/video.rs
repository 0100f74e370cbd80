//! HeyGen Avatar Video Client
//!
//! Wraps the two HeyGen endpoints the tutor uses: requesting an avatar video
//! for a script, and looking up the status of a previously requested video.
//! Video generation is optional; a missing key, avatar or voice turns it off.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_HEYGEN_API_BASE: &str = "https://api.heygen.com";

const GENERATE_PATH: &str = "/v2/video/generate";
const STATUS_PATH: &str = "/v1/video_status.get";
const API_KEY_HEADER: &str = "X-Api-Key";

const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);
const STATUS_TIMEOUT: Duration = Duration::from_secs(30);

const VIDEO_WIDTH: u32 = 1280;
const VIDEO_HEIGHT: u32 = 720;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("{0}")]
    NotConfigured(&'static str),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The reshaped status of a HeyGen video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoStatus {
    pub status: String,
    pub video_url: Option<String>,
    /// The untouched `data` object from the provider.
    pub raw: Value,
}

impl VideoStatus {
    /// Reshapes a HeyGen status response body.
    pub fn from_response(body: &Value) -> Self {
        let raw = body
            .get("data")
            .filter(|data| !data.is_null())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let video_url = raw
            .get("video_url")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            status,
            video_url,
            raw,
        }
    }
}

/// Defines the contract for an avatar video backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Requests an avatar video speaking `script`.
    ///
    /// Returns `Ok(None)` without contacting the provider when video
    /// generation is not configured.
    async fn generate_video(&self, script: &str) -> Result<Option<Value>, VideoError>;

    /// Looks up the status of a previously requested video.
    async fn video_status(&self, video_id: &str) -> Result<VideoStatus, VideoError>;
}

/// Connection settings for HeyGen. Every credential is optional.
#[derive(Clone, Debug)]
pub struct HeyGenConfig {
    pub api_key: Option<String>,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub api_base: String,
}

impl Default for HeyGenConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            avatar_id: None,
            voice_id: None,
            api_base: DEFAULT_HEYGEN_API_BASE.to_string(),
        }
    }
}

impl HeyGenConfig {
    fn api_key(&self) -> Option<&str> {
        non_empty(&self.api_key)
    }

    /// Returns `(api_key, avatar_id, voice_id)` if all three are set.
    fn generation_credentials(&self) -> Option<(&str, &str, &str)> {
        Some((
            self.api_key()?,
            non_empty(&self.avatar_id)?,
            non_empty(&self.voice_id)?,
        ))
    }

    /// Whether video generation will be attempted for chat replies.
    pub fn generation_enabled(&self) -> bool {
        self.generation_credentials().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

// --- Wire types for the generate request ---

#[derive(Serialize, Debug)]
struct GenerateVideoRequest<'a> {
    video_inputs: Vec<VideoInput<'a>>,
    dimension: Dimension,
}

#[derive(Serialize, Debug)]
struct VideoInput<'a> {
    character: Character<'a>,
    voice: Voice<'a>,
}

#[derive(Serialize, Debug)]
struct Character<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    avatar_id: &'a str,
    avatar_style: &'static str,
}

#[derive(Serialize, Debug)]
struct Voice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    input_text: &'a str,
    voice_id: &'a str,
}

#[derive(Serialize, Debug)]
struct Dimension {
    width: u32,
    height: u32,
}

impl<'a> GenerateVideoRequest<'a> {
    fn single_avatar(avatar_id: &'a str, voice_id: &'a str, script: &'a str) -> Self {
        Self {
            video_inputs: vec![VideoInput {
                character: Character {
                    kind: "avatar",
                    avatar_id,
                    avatar_style: "normal",
                },
                voice: Voice {
                    kind: "text",
                    input_text: script,
                    voice_id,
                },
            }],
            dimension: Dimension {
                width: VIDEO_WIDTH,
                height: VIDEO_HEIGHT,
            },
        }
    }
}

/// An implementation of `VideoProvider` backed by the HeyGen REST API.
pub struct HeyGenClient {
    http: reqwest::Client,
    config: HeyGenConfig,
}

impl HeyGenClient {
    pub fn new(config: HeyGenConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &HeyGenConfig {
        &self.config
    }
}

#[async_trait]
impl VideoProvider for HeyGenClient {
    async fn generate_video(&self, script: &str) -> Result<Option<Value>, VideoError> {
        let Some((api_key, avatar_id, voice_id)) = self.config.generation_credentials() else {
            debug!("HeyGen is not configured; skipping video generation");
            return Ok(None);
        };

        let payload = GenerateVideoRequest::single_avatar(avatar_id, voice_id, script);
        info!(avatar_id, script_len = script.len(), "Requesting HeyGen video");

        let body = self
            .http
            .post(self.config.url(GENERATE_PATH))
            .header(API_KEY_HEADER, api_key)
            .timeout(GENERATE_TIMEOUT)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(Some(body))
    }

    async fn video_status(&self, video_id: &str) -> Result<VideoStatus, VideoError> {
        let api_key = self
            .config
            .api_key()
            .ok_or(VideoError::NotConfigured("HEYGEN_API_KEY not configured"))?;

        debug!(video_id, "Looking up HeyGen video status");
        let body = self
            .http
            .get(self.config.url(STATUS_PATH))
            .header(API_KEY_HEADER, api_key)
            .query(&[("video_id", video_id)])
            .timeout(STATUS_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        Ok(VideoStatus::from_response(&body))
    }
}
