//! vidstore-core: shared record types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for the other vidstore crates,
//! providing the [`VideoRecord`] entity, the validated [`NewVideo`] input,
//! a type-safe [`VideoId`], a unified error type, and application
//! configuration loaded from TOML and the environment.

pub mod config;
pub mod error;
pub mod ids;
pub mod record;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::VideoId;
pub use record::{NewVideo, VideoRecord};
