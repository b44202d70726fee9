//! Prompt construction and model-reply parsing for leaf diagnosis.
//!
//! The external model does the actual classification; this module only shapes
//! the request and turns the free-text reply into a `DiseasePrediction`.

use crate::models::DiseasePrediction;
use service_core::error::AppError;

/// System prompt for the diagnosis call.
pub const DIAGNOSIS_SYSTEM_PROMPT: &str = "You are an expert plant pathologist specializing in Indian agriculture. \
Analyze plant leaf images to identify diseases common in India. \
Provide disease name, confidence level (0-100), detailed description, treatment recommendations, and prevention tips. \
Focus on diseases affecting crops like rice, wheat, cotton, sugarcane, pulses, vegetables, and fruits common in India. \
If the leaf appears healthy, indicate that clearly.";

/// User-turn instructions sent alongside the leaf image.
pub const DIAGNOSIS_INSTRUCTIONS: &str = r#"Analyze this plant leaf image and provide:
1. Disease name (or "Healthy" if no disease detected)
2. Confidence level (0-100)
3. Detailed description of the condition
4. List of 3-5 specific treatment recommendations
5. List of 3-5 prevention tips

Format your response EXACTLY as JSON:
{
    "disease_name": "name here",
    "confidence": 85,
    "description": "detailed description",
    "treatments": ["treatment 1", "treatment 2", "treatment 3"],
    "prevention_tips": ["tip 1", "tip 2", "tip 3"]
}"#;

/// System prompt for the conversational endpoint.
pub const ADVISOR_SYSTEM_PROMPT: &str = "You are a helpful plant care expert specializing in Indian agriculture. \
You help farmers and gardeners with: \
general plant care advice, disease diagnosis from symptoms, treatment recommendations, \
best practices for growing common Indian crops, organic and chemical pest control methods, \
and seasonal planting guidance. \
Be concise, practical, and use simple language. Focus on solutions applicable in Indian farming conditions.";

/// Strip Markdown code fences from a model reply, returning the JSON body.
///
/// Models frequently wrap JSON in ```json ... ``` or bare ``` ... ``` fences
/// despite being asked for raw JSON.
pub fn extract_json_block(reply: &str) -> &str {
    if let Some(start) = reply.find("```json") {
        let rest = &reply[start + "```json".len()..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some(start) = reply.find("```") {
        let rest = &reply[start + "```".len()..];
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    reply.trim()
}

/// Parse a model reply into a prediction, defaulting missing fields.
///
/// A reply that contains no parseable JSON at all is an error; individual
/// missing fields are not.
pub fn parse_diagnosis(reply: &str) -> Result<DiseasePrediction, AppError> {
    let raw = extract_json_block(reply);
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
        tracing::error!(error = %e, "Model reply did not contain valid JSON");
        AppError::InternalError(anyhow::anyhow!("Error analyzing image: {}", e))
    })?;

    Ok(DiseasePrediction::new(
        value
            .get("disease_name")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        value
            .get("confidence")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0),
        value
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        string_list(&value, "treatments"),
        string_list(&value, "prevention_tips"),
    ))
}

fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY_JSON: &str = r#"{
        "disease_name": "Bacterial Leaf Blight",
        "confidence": 92,
        "description": "Water-soaked lesions along leaf margins",
        "treatments": ["Apply copper-based bactericide", "Drain the field"],
        "prevention_tips": ["Use certified seed", "Avoid excess nitrogen"]
    }"#;

    #[test]
    fn extracts_bare_json() {
        assert_eq!(extract_json_block("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn extracts_json_fence() {
        let reply = format!("Here you go:\n```json\n{}\n```\nHope that helps!", REPLY_JSON);
        let parsed = parse_diagnosis(&reply).unwrap();
        assert_eq!(parsed.disease_name, "Bacterial Leaf Blight");
        assert_eq!(parsed.confidence, 92.0);
        assert_eq!(parsed.treatments.len(), 2);
    }

    #[test]
    fn extracts_anonymous_fence() {
        let reply = format!("```\n{}\n```", REPLY_JSON);
        let parsed = parse_diagnosis(&reply).unwrap();
        assert_eq!(parsed.prevention_tips.len(), 2);
    }

    #[test]
    fn defaults_missing_fields() {
        let parsed = parse_diagnosis(r#"{"confidence": "high"}"#).unwrap();
        assert_eq!(parsed.disease_name, "Unknown");
        assert_eq!(parsed.confidence, 0.0);
        assert_eq!(parsed.description, "");
        assert!(parsed.treatments.is_empty());
        assert!(parsed.prevention_tips.is_empty());
    }

    #[test]
    fn accepts_fractional_confidence() {
        let parsed = parse_diagnosis(r#"{"confidence": 87.5}"#).unwrap();
        assert_eq!(parsed.confidence, 87.5);
    }

    #[test]
    fn skips_non_string_list_entries() {
        let parsed =
            parse_diagnosis(r#"{"treatments": ["spray", 42, null, "prune"]}"#).unwrap();
        assert_eq!(parsed.treatments, vec!["spray", "prune"]);
    }

    #[test]
    fn rejects_reply_without_json() {
        let result = parse_diagnosis("I am sorry, I cannot identify this leaf.");
        assert!(result.is_err());
    }
}
