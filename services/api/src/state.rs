//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the service clients
//! built once at startup.

use std::sync::Arc;
use tutor_core::{tutor::Tutor, video::VideoProvider};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<Tutor>,
    pub video: Arc<dyn VideoProvider>,
}
