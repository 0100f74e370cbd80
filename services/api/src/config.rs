use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;
use tutor_core::video::{DEFAULT_HEYGEN_API_BASE, HeyGenConfig};

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Defines the supported LLM providers. Both speak the OpenAI chat API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
}

impl Provider {
    /// The OpenAI-compatible base URL of the provider.
    pub fn default_api_base(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub llm_api_base: Option<String>,
    pub chat_model: String,
    pub heygen_api_key: Option<String>,
    pub heygen_avatar_id: Option<String>,
    pub heygen_voice_id: Option<String>,
    pub heygen_api_base: String,
    pub strict_reply_schema: bool,
    pub prompt_path: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:10000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            other => {
                return Err(ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("'{}' is not one of 'openai', 'gemini'", other),
                ));
            }
        };

        let openai_api_key = optional_var("OPENAI_API_KEY");
        let gemini_api_key = optional_var("GEMINI_API_KEY");
        let llm_api_base = optional_var("LLM_API_BASE");

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());

        let heygen_api_key = optional_var("HEYGEN_API_KEY");
        let heygen_avatar_id = optional_var("HEYGEN_AVATAR_ID");
        let heygen_voice_id = optional_var("HEYGEN_VOICE_ID");
        let heygen_api_base = std::env::var("HEYGEN_API_BASE")
            .unwrap_or_else(|_| DEFAULT_HEYGEN_API_BASE.to_string());

        let strict_reply_schema = match std::env::var("STRICT_REPLY_SCHEMA") {
            Ok(value) => parse_bool(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "STRICT_REPLY_SCHEMA".to_string(),
                    format!("'{}' is not a boolean", value),
                )
            })?,
            Err(_) => false,
        };

        let prompt_path = optional_var("PROMPT_PATH").map(PathBuf::from);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        match provider {
            Provider::OpenAI => {
                if openai_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                    ));
                }
            }
            Provider::Gemini => {
                if gemini_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            gemini_api_key,
            llm_api_base,
            chat_model,
            heygen_api_key,
            heygen_avatar_id,
            heygen_voice_id,
            heygen_api_base,
            strict_reply_schema,
            prompt_path,
            log_level,
        })
    }

    /// The API key of the selected LLM provider.
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Gemini => self.gemini_api_key.as_deref(),
        }
    }

    /// The base URL for the LLM, honoring `LLM_API_BASE` when set.
    pub fn llm_api_base(&self) -> &str {
        self.llm_api_base
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_base())
    }

    pub fn heygen(&self) -> HeyGenConfig {
        HeyGenConfig {
            api_key: self.heygen_api_key.clone(),
            avatar_id: self.heygen_avatar_id.clone(),
            voice_id: self.heygen_voice_id.clone(),
            api_base: self.heygen_api_base.clone(),
        }
    }
}

/// Reads a variable, treating an empty value the same as an unset one.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
