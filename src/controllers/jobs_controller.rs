use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::{doc, Bson};
use mongodb::options::FindOneOptions;
use serde_json::json;

use crate::{
    models::Product,
    services::{alert_evaluator, offer_aggregator},
    AppState,
};

/// Job endpoints are called by a scheduler, not a browser session. When
/// CRON_SECRET is configured they require `Authorization: Bearer <secret>`;
/// an empty secret disables the check (dev).
fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let expected = state.settings.cron_secret.trim();
    if expected.is_empty() {
        return true;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {expected}"))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
}

// POST /jobs/calculate-offers
pub async fn post_calculate_offers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let started = Instant::now();

    match offer_aggregator::recompute_all(&state).await {
        Ok(summary) => {
            tracing::info!(
                "offer recompute: processed={} updated={} errors={}",
                summary.processed,
                summary.updated,
                summary.errors
            );

            (
                StatusCode::OK,
                Json(json!({
                    "ok": true,
                    "stats": {
                        "processed": summary.processed,
                        "updated": summary.updated,
                        "errors": summary.errors,
                        "duration_ms": started.elapsed().as_millis() as u64,
                    }
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("offer recompute failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to recompute offers" })),
            )
                .into_response()
        }
    }
}

// GET /jobs/calculate-offers  (last-run info)
pub async fn get_calculate_offers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let products = state.db.collection::<Product>("products");

    let opts = FindOneOptions::builder()
        .sort(doc! { "last_price_check": -1 })
        .build();

    let last_check = match products
        .find_one(doc! { "last_price_check": { "$ne": Bson::Null } }, opts)
        .await
    {
        Ok(p) => p.and_then(|p| p.last_price_check),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("db error: {e}") })),
            )
                .into_response();
        }
    };

    let with_offers = match products
        .count_documents(doc! { "offer_score": { "$ne": Bson::Null } }, None)
        .await
    {
        Ok(n) => n,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("db error: {e}") })),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "last_check": last_check,
            "products_with_offers": with_offers,
        })),
    )
        .into_response()
}

// POST /jobs/check-alerts
pub async fn post_check_alerts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    match alert_evaluator::evaluate_all(&state).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "checked": summary.checked,
                "triggered": summary.triggered,
                "errors": summary.errors,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("alert check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to check alerts" })),
            )
                .into_response()
        }
    }
}
