use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of a plant-care conversation. Append-only per session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: MessageRole,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(session_id: String, message: String, image_base64: Option<String>) -> Self {
        Self::new(session_id, MessageRole::User, message, image_base64)
    }

    pub fn assistant(session_id: String, message: String) -> Self {
        Self::new(session_id, MessageRole::Assistant, message, None)
    }

    fn new(
        session_id: String,
        role: MessageRole,
        message: String,
        image_base64: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            role,
            message,
            image_base64,
            timestamp: Utc::now(),
        }
    }
}
