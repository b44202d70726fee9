use crate::models::DiseasePrediction;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, message = "image_base64 must not be empty"))]
    pub image_base64: String,
}

/// Wire shape of a prediction. The image payload is never echoed back.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub id: String,
    pub disease_name: String,
    pub confidence: f64,
    pub description: String,
    pub treatments: Vec<String>,
    pub prevention_tips: Vec<String>,
    pub timestamp: String,
}

impl From<DiseasePrediction> for PredictionResponse {
    fn from(prediction: DiseasePrediction) -> Self {
        Self {
            id: prediction.id,
            disease_name: prediction.disease_name,
            confidence: prediction.confidence,
            description: prediction.description,
            treatments: prediction.treatments,
            prevention_tips: prediction.prevention_tips,
            timestamp: prediction.timestamp.to_rfc3339(),
        }
    }
}
