//! Core logic for the avatar tutor: the structured reply contract, the LLM
//! seam, the HeyGen video seam and the [`tutor::Tutor`] that chains them.

pub mod llm_client;
pub mod reply;
pub mod tutor;
pub mod video;

/// The learner language assumed when a request does not name one.
pub const DEFAULT_USER_LANGUAGE: &str = "en";
