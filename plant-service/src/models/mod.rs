pub mod chat;
pub mod prediction;

pub use chat::{ChatMessage, MessageRole};
pub use prediction::DiseasePrediction;
