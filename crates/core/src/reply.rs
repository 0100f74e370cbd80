//! The Tutor Reply Contract
//!
//! The LLM is instructed, through the system prompt, to answer with a single
//! JSON object of a fixed shape. This module holds that prompt and the typed
//! view of the reply used when strict validation is switched on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The system prompt template. `{user_language}` is substituted per request.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../prompts/tutor_system.md");

const USER_LANGUAGE_PLACEHOLDER: &str = "{user_language}";

/// Renders a system prompt template for the given learner language.
pub fn build_system_prompt(template: &str, user_language: &str) -> String {
    template.replace(USER_LANGUAGE_PLACEHOLDER, user_language)
}

/// The kind of teaching aid attached to a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VisualType {
    #[default]
    None,
    SentencePair,
    Table,
}

/// A structured teaching aid for the frontend to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VisualPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Row objects whose shape depends on the reply's `visual_type`.
    #[serde(default)]
    pub data: Value,
}

/// The JSON object the tutor LLM is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorReply {
    pub reply: String,
    pub needs_visual: bool,
    pub visual_type: VisualType,
    #[serde(default)]
    pub visual_payload: VisualPayload,
}

/// Ways a reply can break the contract stated in the system prompt.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ReplyError {
    #[error("tutor reply does not match the expected shape: {0}")]
    Shape(String),
    #[error("visual_payload.data must be an array for visual_type '{0}'")]
    DataNotArray(&'static str),
    #[error("visual_payload.data row {0} must be an object")]
    RowNotObject(usize),
    #[error("sentence pair {0} must have string 'source' and 'target' fields")]
    IncompletePair(usize),
    #[error("visual_payload.data must be empty when visual_type is 'none'")]
    UnexpectedData,
}

impl TutorReply {
    /// Deserializes and validates an LLM reply object.
    pub fn from_value(value: &Value) -> Result<Self, ReplyError> {
        let reply = Self::deserialize(value).map_err(|e| ReplyError::Shape(e.to_string()))?;
        reply.validate()?;
        Ok(reply)
    }

    /// Checks that `visual_payload.data` has the shape dictated by `visual_type`.
    pub fn validate(&self) -> Result<(), ReplyError> {
        let data = &self.visual_payload.data;
        match self.visual_type {
            VisualType::None => match data {
                Value::Null => Ok(()),
                Value::Array(rows) if rows.is_empty() => Ok(()),
                Value::Object(map) if map.is_empty() => Ok(()),
                _ => Err(ReplyError::UnexpectedData),
            },
            VisualType::SentencePair => {
                let rows = data
                    .as_array()
                    .ok_or(ReplyError::DataNotArray("sentence_pair"))?;
                for (i, row) in rows.iter().enumerate() {
                    let pair = row.as_object().ok_or(ReplyError::RowNotObject(i))?;
                    let has = |key: &str| pair.get(key).is_some_and(Value::is_string);
                    if !has("source") || !has("target") {
                        return Err(ReplyError::IncompletePair(i));
                    }
                }
                Ok(())
            }
            VisualType::Table => {
                let rows = data.as_array().ok_or(ReplyError::DataNotArray("table"))?;
                match rows.iter().position(|row| !row.is_object()) {
                    Some(i) => Err(ReplyError::RowNotObject(i)),
                    None => Ok(()),
                }
            }
        }
    }
}
