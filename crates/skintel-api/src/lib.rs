//! HTTP client for the skintel backend
//!
//! Covers the chat endpoints the chat surfaces use: `/chatbot`,
//! `/chatbot/status` and `/skin-advice`.

mod client;
mod error;

pub use client::{SkintelClient, DEFAULT_TIMEOUT};
pub use error::ApiError;
