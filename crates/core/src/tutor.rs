//! Tutor Orchestration
//!
//! A single tutor turn is a fixed chain: render the system prompt, ask the LLM
//! for a JSON reply, optionally have the avatar speak the reply, and merge the
//! two results into one JSON object for the caller.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    llm_client::LLMClient,
    reply::{TutorReply, build_system_prompt},
    video::VideoProvider,
};

/// The key under which the video provider's response is attached.
pub const HEYGEN_VIDEO_KEY: &str = "heygen_video";

/// The merged result of one tutor turn: the LLM's reply object plus the
/// video provider's response (or `null`) under `heygen_video`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TutorResponse(Map<String, Value>);

impl TutorResponse {
    fn new(mut reply: Map<String, Value>, heygen_video: Option<Value>) -> Self {
        reply.insert(
            HEYGEN_VIDEO_KEY.to_string(),
            heygen_video.unwrap_or(Value::Null),
        );
        Self(reply)
    }
}

/// Drives a tutor turn against an LLM and an avatar video backend.
pub struct Tutor {
    llm: Arc<dyn LLMClient>,
    video: Arc<dyn VideoProvider>,
    prompt_template: String,
    strict_replies: bool,
}

impl Tutor {
    /// Creates a new tutor.
    ///
    /// # Arguments
    ///
    /// * `llm` - The client used to request the structured reply.
    /// * `video` - The avatar video backend the reply is forwarded to.
    /// * `prompt_template` - The system prompt, with a `{user_language}` placeholder.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        video: Arc<dyn VideoProvider>,
        prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            video,
            prompt_template: prompt_template.into(),
            strict_replies: false,
        }
    }

    /// Rejects replies whose shape does not match [`TutorReply`].
    pub fn with_strict_replies(mut self, strict: bool) -> Self {
        self.strict_replies = strict;
        self
    }

    /// Runs one tutor turn for `message`.
    ///
    /// Any failure, including one from the video provider after the LLM has
    /// already answered, fails the whole turn.
    pub async fn respond(&self, message: &str, user_language: &str) -> Result<TutorResponse> {
        let system_prompt = build_system_prompt(&self.prompt_template, user_language);

        let content = self.llm.complete_json(&system_prompt, message).await?;
        let reply = self.parse_reply(&content)?;

        let script = reply.get("reply").and_then(Value::as_str).unwrap_or_default();
        let heygen_video = if script.is_empty() {
            debug!("Tutor reply is empty; skipping video generation");
            None
        } else {
            self.video
                .generate_video(script)
                .await
                .context("Video generation failed")?
        };

        info!(
            user_language,
            has_video = heygen_video.is_some(),
            "Tutor turn completed"
        );
        Ok(TutorResponse::new(reply, heygen_video))
    }

    fn parse_reply(&self, content: &str) -> Result<Map<String, Value>> {
        let value: Value =
            serde_json::from_str(content).context("LLM returned malformed JSON")?;

        if self.strict_replies {
            TutorReply::from_value(&value)?;
        }

        match value {
            Value::Object(map) => Ok(map),
            other => Err(anyhow!(
                "LLM returned a JSON {} instead of an object",
                json_kind(&other)
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        llm_client::MockLLMClient,
        reply::DEFAULT_SYSTEM_PROMPT,
        video::{MockVideoProvider, VideoError},
    };
    use serde_json::json;

    const PAIR_REPLY: &str = r#"{
        "reply": "'Chat' means cat.",
        "needs_visual": true,
        "visual_type": "sentence_pair",
        "visual_payload": {
            "title": "Animals",
            "description": "Basic vocabulary",
            "data": [{"source": "le chat", "target": "the cat"}]
        }
    }"#;

    fn llm_returning(content: &'static str) -> MockLLMClient {
        let mut llm = MockLLMClient::new();
        llm.expect_complete_json()
            .times(1)
            .returning(move |_, _| Ok(content.to_string()));
        llm
    }

    fn video_never_called() -> MockVideoProvider {
        let mut video = MockVideoProvider::new();
        video.expect_generate_video().times(0);
        video
    }

    fn tutor(llm: MockLLMClient, video: MockVideoProvider) -> Tutor {
        Tutor::new(Arc::new(llm), Arc::new(video), DEFAULT_SYSTEM_PROMPT)
    }

    #[tokio::test]
    async fn test_respond_merges_reply_and_video() {
        let mut video = MockVideoProvider::new();
        video
            .expect_generate_video()
            .withf(|script| script.to_string() == "'Chat' means cat.")
            .times(1)
            .returning(|_| Ok(Some(json!({"data": {"video_id": "vid-1"}}))));

        let response = tutor(llm_returning(PAIR_REPLY), video)
            .respond("How do I say cat?", "en")
            .await
            .unwrap();

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["reply"], "'Chat' means cat.");
        assert_eq!(body[HEYGEN_VIDEO_KEY]["data"]["video_id"], "vid-1");
        assert_eq!(body["visual_type"], "sentence_pair");
        assert_eq!(body["visual_payload"]["data"][0]["source"], "le chat");
    }

    #[tokio::test]
    async fn test_respond_sets_null_video_when_skipped() {
        let mut video = MockVideoProvider::new();
        video.expect_generate_video().returning(|_| Ok(None));

        let response = tutor(llm_returning(PAIR_REPLY), video)
            .respond("hi", "en")
            .await
            .unwrap();

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body[HEYGEN_VIDEO_KEY], Value::Null);
        assert!(body.as_object().unwrap().contains_key(HEYGEN_VIDEO_KEY));
    }

    #[tokio::test]
    async fn test_respond_passes_language_and_message_to_llm() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete_json()
            .withf(|system, user| {
                system.contains("The learner's native language is: pt.")
                    && user.to_string() == "Como se diz gato?"
            })
            .times(1)
            .returning(|_, _| Ok(r#"{"reply": ""}"#.to_string()));

        let response = tutor(llm, video_never_called())
            .respond("Como se diz gato?", "pt")
            .await
            .unwrap();

        assert_eq!(serde_json::to_value(&response).unwrap()[HEYGEN_VIDEO_KEY], Value::Null);
    }

    #[tokio::test]
    async fn test_respond_keeps_unknown_fields() {
        let response = tutor(
            llm_returning(r#"{"reply": "", "confidence": 0.9}"#),
            video_never_called(),
        )
        .respond("hi", "en")
        .await
        .unwrap();

        assert_eq!(serde_json::to_value(&response).unwrap()["confidence"], 0.9);
    }

    #[tokio::test]
    async fn test_respond_malformed_json_fails_without_video_call() {
        let err = tutor(llm_returning("Sure! Here is your answer"), video_never_called())
            .respond("hi", "en")
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("malformed JSON"));
    }

    #[tokio::test]
    async fn test_respond_non_object_json_fails() {
        let err = tutor(llm_returning(r#"["reply"]"#), video_never_called())
            .respond("hi", "en")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("array"));
    }

    #[tokio::test]
    async fn test_respond_llm_error_propagates() {
        let mut llm = MockLLMClient::new();
        llm.expect_complete_json()
            .returning(|_, _| Err(anyhow!("connection refused")));

        let err = tutor(llm, video_never_called())
            .respond("hi", "en")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_respond_video_error_discards_reply() {
        let mut video = MockVideoProvider::new();
        video
            .expect_generate_video()
            .times(1)
            .returning(|_| Err(VideoError::NotConfigured("boom")));

        let err = tutor(llm_returning(PAIR_REPLY), video)
            .respond("hi", "en")
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Video generation failed"));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_contract_violation() {
        let bad = r#"{
            "reply": "",
            "needs_visual": true,
            "visual_type": "table",
            "visual_payload": {"title": "", "description": "", "data": "a | b"}
        }"#;

        let lenient = tutor(llm_returning(bad), video_never_called());
        assert!(lenient.respond("hi", "en").await.is_ok());

        let strict = tutor(llm_returning(bad), video_never_called()).with_strict_replies(true);
        let err = strict.respond("hi", "en").await.unwrap_err();
        assert!(err.to_string().contains("must be an array"));
    }

    #[tokio::test]
    async fn test_strict_mode_accepts_valid_reply() {
        let mut video = MockVideoProvider::new();
        video.expect_generate_video().returning(|_| Ok(None));

        let strict = tutor(llm_returning(PAIR_REPLY), video).with_strict_replies(true);
        assert!(strict.respond("hi", "en").await.is_ok());
    }
}
