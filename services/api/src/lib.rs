//! Avatar Tutor API Library Crate
//!
//! This library contains the HTTP surface of the avatar tutor: configuration,
//! the shared application state, API handlers, and routing. The binaries in
//! `bin/` are thin wrappers around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
