use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::models::{AnalysisRequest, DEFAULT_BATCH_LIMIT};
use crate::services::MealInsightGenerator;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<MealInsightGenerator>,
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct AuthQuery {
    token: Option<String>,
}

pub fn create_insight_router(generator: Arc<MealInsightGenerator>, access_token: Option<String>) -> Router {
    let state = AppState {
        generator,
        access_token,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/meals/insight", post(insight_handler))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Verify access token
fn verify_token(query: &AuthQuery, access_token: Option<&str>) -> Result<(), StatusCode> {
    match access_token {
        None => Ok(()),
        Some(expected) if query.token.as_deref() == Some(expected) => Ok(()),
        Some(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn health_check() -> &'static str {
    "OK"
}

async fn insight_handler(
    Query(query): Query<AuthQuery>,
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    verify_token(&query, state.access_token.as_deref())?;

    log::info!("🔔 Insight request with {} entries", request.entries.len());
    if request.entries.len() > DEFAULT_BATCH_LIMIT {
        log::warn!(
            "⚠️ Batch of {} entries exceeds the usual {}, sending as-is",
            request.entries.len(),
            DEFAULT_BATCH_LIMIT
        );
    }

    let result = state.generator.analyze(&request).await;
    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    Ok((status, Json(result)))
}
