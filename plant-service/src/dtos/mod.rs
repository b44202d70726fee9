pub mod chat;
pub mod predictions;

pub use chat::{ChatHistoryEntry, ChatRequest, ChatResponse};
pub use predictions::{PredictRequest, PredictionResponse};
