//! Cube face vision provider infrastructure adapter.
//!
//! Implements the [`pipeline::VisionOracle`] trait for Google's Gemini
//! `generateContent` API. Additional providers are added as new modules in
//! this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, inline image
//! encoding, and response parsing live here. The [`pipeline`] crate sees only
//! [`pipeline::VisionOracle`] and [`pipeline::VisionError`].
//!
//! ## Credentials
//!
//! This crate reads no environment variables. The composition root resolves
//! the key, model and base URL from its own configuration and builds a
//! [`GeminiConfig`]; without a key it runs the acquirer with no oracle, so
//! every face comes from the fallback grid.

mod gemini;

pub use gemini::{GeminiConfig, GeminiVisionOracle, DEFAULT_BASE_URL, DEFAULT_MODEL};

use thiserror::Error;

/// Errors raised while constructing a provider.
///
/// Errors during a call are reported as [`pipeline::VisionError`] instead.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}
