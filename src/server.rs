use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog;
use crate::model::ModelBundle;
use crate::schema::{format_violations, CropInput, FieldViolation};

// ---------- Server state ----------

/// Shared read-only state. `bundle` is `None` only when startup was bypassed
/// (the production path aborts before serving if loading fails); requests
/// against an unloaded state get a server error, never a partial result.
#[derive(Clone, Default)]
pub struct AppState {
    pub bundle: Option<Arc<ModelBundle>>,
}

// ---------- Response types ----------

#[derive(Serialize, Debug, PartialEq)]
pub struct Top3Entry {
    pub crop: String,
    pub crops_in_group: Vec<String>,
    pub probability_pct: f64,
}

#[derive(Serialize, Debug)]
pub struct PredictionResponse {
    pub recommended_crop: String,
    pub crops_in_group: Vec<String>,
    pub explanation: String,
    pub confidence_pct: f64,
    pub top3_recommendations: Vec<Top3Entry>,
}

// ---------- Error taxonomy ----------

#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more input fields missing or out of range; 422 with every
    /// violation listed, one per line.
    #[error("{}", format_violations(.0))]
    Validation(Vec<FieldViolation>),
    #[error("Server error: models not loaded")]
    ModelsNotLoaded,
    #[error("Prediction error: {0}")]
    Inference(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelsNotLoaded | ApiError::Inference(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// ---------- Response assembly ----------

/// Probability as a percentage rounded to two decimal places.
pub fn round_pct(p: f64) -> f64 {
    (p * 10_000.0).round() / 100.0
}

fn owned_crops(label: &str) -> Vec<String> {
    catalog::crops_for(label).iter().map(|c| c.to_string()).collect()
}

/// Build the response payload from the full descending (label, probability)
/// ranking: primary recommendation plus the top-3 entries, enriched from the
/// catalog. An empty ranking yields `None`.
pub fn build_response(ranked: &[(String, f64)]) -> Option<PredictionResponse> {
    let (best_label, best_prob) = ranked.first()?;
    let top3 = ranked
        .iter()
        .take(3)
        .map(|(label, prob)| Top3Entry {
            crop: label.clone(),
            crops_in_group: owned_crops(label),
            probability_pct: round_pct(*prob),
        })
        .collect();

    Some(PredictionResponse {
        recommended_crop: best_label.clone(),
        crops_in_group: owned_crops(best_label),
        explanation: catalog::explanation_for(best_label).to_string(),
        confidence_pct: round_pct(*best_prob),
        top3_recommendations: top3,
    })
}

// ---------- Handlers ----------

pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<CropInput>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let features = payload.validate().map_err(ApiError::Validation)?;
    let bundle = state.bundle.as_ref().ok_or(ApiError::ModelsNotLoaded)?;

    let ranked = bundle
        .predict(&features)
        .map_err(|e| ApiError::Inference(e.to_string()))?;
    let response = build_response(&ranked)
        .ok_or_else(|| ApiError::Inference("classifier returned no classes".into()))?;

    tracing::debug!(
        recommended = %response.recommended_crop,
        confidence = response.confidence_pct,
        "prediction served"
    );
    Ok(Json(response))
}

pub fn health_status(loaded: bool) -> &'static str {
    if loaded {
        "healthy"
    } else {
        "models not loaded"
    }
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": health_status(state.bundle.is_some()) }))
}

// Root redirects to the web UI.
pub async fn root() -> Redirect {
    Redirect::to("/static/")
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}
