use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single disease diagnosis produced by the external model.
///
/// Only the diagnosis itself is recorded; the leaf image that prompted it is
/// never part of the stored document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseasePrediction {
    pub id: String,
    pub disease_name: String,
    /// Model-reported confidence, 0-100.
    pub confidence: f64,
    pub description: String,
    pub treatments: Vec<String>,
    pub prevention_tips: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl DiseasePrediction {
    pub fn new(
        disease_name: String,
        confidence: f64,
        description: String,
        treatments: Vec<String>,
        prevention_tips: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            disease_name,
            confidence,
            description,
            treatments,
            prevention_tips,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_assigns_unique_id_and_timestamp() {
        let a = DiseasePrediction::new(
            "Leaf Blight".to_string(),
            87.5,
            "Fungal infection".to_string(),
            vec!["Apply fungicide".to_string()],
            vec!["Rotate crops".to_string()],
        );
        let b = DiseasePrediction::new(
            "Leaf Blight".to_string(),
            87.5,
            "Fungal infection".to_string(),
            vec![],
            vec![],
        );
        assert_ne!(a.id, b.id);
        assert!(a.timestamp <= Utc::now());
    }

    #[test]
    fn serialized_form_has_no_image_field() {
        let prediction = DiseasePrediction::new(
            "Leaf Blight".to_string(),
            87.5,
            "Fungal infection".to_string(),
            vec![],
            vec![],
        );
        let doc = mongodb::bson::to_document(&prediction).unwrap();
        assert!(doc.get("image_base64").is_none());
        assert!(doc.get("disease_name").is_some());
    }
}
