use crate::models::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "session_id must not be empty"))]
    pub session_id: String,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    pub image_base64: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    pub timestamp: String,
}

impl From<ChatMessage> for ChatHistoryEntry {
    fn from(msg: ChatMessage) -> Self {
        Self {
            id: msg.id,
            session_id: msg.session_id,
            role: msg.role,
            message: msg.message,
            image_base64: msg.image_base64,
            timestamp: msg.timestamp.to_rfc3339(),
        }
    }
}
