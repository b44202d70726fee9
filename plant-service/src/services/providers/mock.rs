//! Mock provider implementation for testing.

use super::{FinishReason, ImageAttachment, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock text provider with a scripted reply queue.
///
/// Replies are consumed in order; once exhausted the provider falls back to
/// echoing the incoming message.
pub struct MockTextProvider {
    replies: Mutex<VecDeque<String>>,
}

impl MockTextProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }

    pub fn with_replies<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }
}

impl Default for MockTextProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        message: &str,
        _image: Option<&ImageAttachment>,
    ) -> Result<ProviderResponse, ProviderError> {
        // Simulate some processing
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let scripted = self
            .replies
            .lock()
            .expect("mock reply queue poisoned")
            .pop_front();
        let text = scripted.unwrap_or_else(|| format!("Mock response for: {}", message));

        Ok(ProviderResponse {
            text: Some(text),
            input_tokens: message.len() as i32 / 4,
            output_tokens: 10,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
