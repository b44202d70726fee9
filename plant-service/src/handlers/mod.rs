pub mod chat;
pub mod health;
pub mod predictions;

pub use chat::{chat, chat_history};
pub use health::{health_check, metrics_endpoint, readiness_check, root};
pub use predictions::{list_predictions, predict};

use crate::services::metrics;
use crate::services::providers::ImageAttachment;
use crate::startup::AppState;
use service_core::error::AppError;
use std::time::Instant;

/// Run one model turn, recording latency, token, and error metrics.
///
/// All provider failures collapse to a generic server error for the caller;
/// the specific cause is kept in logs and metrics.
async fn generate_reply(
    state: &AppState,
    system_prompt: &str,
    message: &str,
    image: Option<&ImageAttachment>,
) -> Result<String, AppError> {
    let provider = state.llm.name();
    let model = state.config.models.text_model.as_str();

    let started = Instant::now();
    let response = state
        .llm
        .generate(system_prompt, message, image)
        .await
        .map_err(|e| {
            metrics::record_provider_error(provider, e.kind());
            tracing::error!(provider, error = %e, "Model call failed");
            AppError::from(e)
        })?;
    metrics::record_provider_latency(provider, model, started.elapsed().as_secs_f64());
    metrics::record_tokens(model, response.input_tokens, response.output_tokens);

    response.text.ok_or_else(|| {
        metrics::record_provider_error(provider, "empty_reply");
        tracing::error!(provider, "Model returned no text");
        AppError::InternalError(anyhow::anyhow!("Model returned no text"))
    })
}
