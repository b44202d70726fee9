//! External model abstractions and implementations.
//!
//! This module provides a trait-based abstraction over the hosted LLM,
//! allowing the Gemini backend to be swapped for a mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::ContentFiltered => "content_filtered",
            ProviderError::NetworkError(_) => "network_error",
        }
    }
}

// Every pipeline failure surfaces to callers as a generic server error;
// the variant only matters for logs and metrics.
impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::InternalError(anyhow::anyhow!(err))
    }
}

/// Base64 image attachment for a multimodal request.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data_base64: String,
}

impl ImageAttachment {
    /// Attachment with the default leaf-photo mime type.
    pub fn jpeg(data_base64: impl Into<String>) -> Self {
        Self {
            mime_type: "image/jpeg".to_string(),
            data_base64: data_base64.into(),
        }
    }
}

/// Result of a provider call.
pub struct ProviderResponse {
    /// Text content of the reply, if the model produced any.
    pub text: Option<String>,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    /// Finish reason.
    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Trait for single-turn text generation against the hosted model.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a reply for one user turn, optionally with an inline image.
    async fn generate(
        &self,
        system_prompt: &str,
        message: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Provider label for logs and metrics.
    fn name(&self) -> &'static str;
}
