//! Core types, configuration, and error handling for tempo.
//!
//! This crate provides the shared foundation used by the other tempo crates:
//! - [`TempoError`]: unified error type using `thiserror` and `miette`
//! - [`TempoConfig`]: configuration loaded from `.tempo.toml`
//! - Shared types: [`OutputFormat`], [`RenderMode`]

mod config;
mod error;
mod types;

pub use config::{DiagnosticsConfig, InputConfig, RenderConfig, TempoConfig};
pub use error::TempoError;
pub use types::{OutputFormat, RenderMode};

/// A convenience `Result` type for tempo operations.
pub type Result<T> = std::result::Result<T, TempoError>;
