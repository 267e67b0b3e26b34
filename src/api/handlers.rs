//! Endpoint handlers
//!
//! - `GET /api/`: service banner
//! - `GET /api/symptoms`: known symptoms
//! - `GET /api/conditions`: known conditions
//! - `POST /api/predict`: predict and record
//! - `GET /api/analytics`: symptom report counts

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::ApiError;
use crate::context::{AppContext, PredictionInput, PredictionOutcome};
use crate::db::{Condition, Symptom, SymptomFrequency};
use crate::error::Error;

/// `GET /api/` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
}

/// `POST /api/predict` body. Both fields are required; `None` means absent.
#[derive(Debug, Default, Deserialize)]
pub struct PredictRequest {
    pub symptoms: Option<Vec<i64>>,
    pub severities: Option<Vec<String>>,
}

pub async fn info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "AI Symptom Checker API is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn symptoms(State(ctx): State<AppContext>) -> Result<Json<Vec<Symptom>>, ApiError> {
    ctx.symptoms()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, "Failed to fetch symptoms"))
}

pub async fn conditions(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<Condition>>, ApiError> {
    ctx.conditions()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, "Failed to fetch conditions"))
}

pub async fn predict(
    State(ctx): State<AppContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionOutcome>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!("Rejected predict body: {}", rejection.body_text());
        ApiError::BadRequest(rejection_message(&rejection).to_string())
    })?;

    let request =
        parse_request(body).map_err(|e| ApiError::from_error(e, "Prediction failed"))?;

    let input = PredictionInput::parse(request.symptoms, request.severities)
        .map_err(|e| ApiError::from_error(e, "Prediction failed"))?;

    ctx.predict(&input)
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, "Prediction failed"))
}

/// Only a JSON object of the request shape is a request. Arrays, scalars
/// and mistyped fields all count as missing fields.
fn parse_request(body: Value) -> Result<PredictRequest, Error> {
    if !body.is_object() {
        return Err(Error::MissingFields);
    }
    serde_json::from_value(body).map_err(|_| Error::MissingFields)
}

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
        _ => "Invalid request body",
    }
}

pub async fn analytics(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<SymptomFrequency>>, ApiError> {
    ctx.analytics()
        .await
        .map(Json)
        .map_err(|e| ApiError::from_error(e, "Failed to fetch analytics"))
}
