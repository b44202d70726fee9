use crate::dtos::{ChatHistoryEntry, ChatRequest, ChatResponse};
use crate::models::ChatMessage;
use crate::services::diagnosis::ADVISOR_SYSTEM_PROMPT;
use crate::services::metrics;
use crate::services::providers::ImageAttachment;
use crate::startup::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use validator::Validate;

/// Chat history reads are capped at 1000 messages per session.
const CHAT_HISTORY_LIMIT: i64 = 1000;

/// One conversation turn: persist the user message, ask the model, persist
/// and return the reply.
///
/// History is stored but not replayed to the model; each call carries only
/// the current turn plus the system prompt.
#[tracing::instrument(skip(state, req), fields(session_id))]
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    tracing::Span::current().record("session_id", req.session_id.as_str());

    let user_msg = ChatMessage::user(
        req.session_id.clone(),
        req.message.clone(),
        req.image_base64.clone(),
    );
    state.db.insert_chat_message(&user_msg).await?;

    let image = req.image_base64.as_deref().map(ImageAttachment::jpeg);
    let reply = super::generate_reply(&state, ADVISOR_SYSTEM_PROMPT, &req.message, image.as_ref())
        .await
        .inspect_err(|_| metrics::record_chat_turn("error"))?;

    let assistant_msg = ChatMessage::assistant(req.session_id.clone(), reply.clone());
    state.db.insert_chat_message(&assistant_msg).await?;

    metrics::record_chat_turn("ok");

    Ok(Json(ChatResponse {
        session_id: req.session_id,
        response: reply,
    }))
}

/// All messages for a session in chronological order.
#[tracing::instrument(skip(state))]
pub async fn chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state
        .db
        .session_history(&session_id, CHAT_HISTORY_LIMIT)
        .await?;

    Ok(Json(
        messages
            .into_iter()
            .map(ChatHistoryEntry::from)
            .collect::<Vec<_>>(),
    ))
}
