use crate::dtos::{PredictRequest, PredictionResponse};
use crate::services::diagnosis::{
    parse_diagnosis, DIAGNOSIS_INSTRUCTIONS, DIAGNOSIS_SYSTEM_PROMPT,
};
use crate::services::metrics;
use crate::services::providers::ImageAttachment;
use crate::startup::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use base64::Engine;
use service_core::error::AppError;
use validator::Validate;

/// Prediction history is capped at the 50 most recent entries.
const PREDICTION_HISTORY_LIMIT: i64 = 50;

/// Diagnose a plant leaf image via the external model and store the result.
#[tracing::instrument(skip(state, req))]
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    // Reject payloads that could never reach the model as images.
    base64::engine::general_purpose::STANDARD
        .decode(&req.image_base64)
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("image_base64 is not valid base64: {}", e)))?;

    let image = ImageAttachment::jpeg(req.image_base64);
    let reply = super::generate_reply(
        &state,
        DIAGNOSIS_SYSTEM_PROMPT,
        DIAGNOSIS_INSTRUCTIONS,
        Some(&image),
    )
    .await
    .inspect_err(|_| metrics::record_prediction("error"))?;

    let prediction = parse_diagnosis(&reply).inspect_err(|e| {
        metrics::record_prediction("error");
        tracing::error!(error = %e, "Failed to parse diagnosis reply");
    })?;

    state.db.insert_prediction(&prediction).await?;

    metrics::record_prediction("ok");
    tracing::info!(
        prediction_id = %prediction.id,
        disease = %prediction.disease_name,
        confidence = prediction.confidence,
        "Stored new prediction"
    );

    Ok(Json(PredictionResponse::from(prediction)))
}

/// Most recent predictions, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_predictions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let predictions = state
        .db
        .recent_predictions(PREDICTION_HISTORY_LIMIT)
        .await?;

    Ok(Json(
        predictions
            .into_iter()
            .map(PredictionResponse::from)
            .collect::<Vec<_>>(),
    ))
}
