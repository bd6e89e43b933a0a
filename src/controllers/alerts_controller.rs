use axum::{
    extract::{Extension, Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::CurrentUser,
    render,
    services::{alerts_service, products_service},
    AppState,
};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn unauthorized_snippet() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Html(r#"<div class="text-danger">Unauthorized</div>"#.to_string()),
    )
        .into_response()
}

fn fmt_cents(cents: i64) -> String {
    format!("{},{:02}", cents / 100, (cents % 100).abs())
}

/// Parse a user-entered price ("R$ 1.234,56", "1234,56", "1234.56", "1234")
/// into integer cents. Rejects non-positive values.
pub fn parse_target_price(input: &str) -> Option<i64> {
    let mut s: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .replace("R$", "");

    // Brazilian format: dots group thousands, comma separates cents.
    if s.contains(',') {
        s = s.replace('.', "").replace(',', ".");
    }

    let value: f64 = s.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some((value * 100.0).round() as i64)
}

// ---------------- Pages ----------------

// GET /alerts
pub async fn get_alerts_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let body = state
        .hbs
        .render("pages/alerts", &json!({}))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, "Price alerts", body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// ---------------- Partials ----------------

// GET /alerts/list
pub async fn get_alerts_list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-muted small">Log in to manage alerts.</div>"#.to_string()),
        )
            .into_response();
    };

    let alerts = match alerts_service::list_user_alerts(&state, u.id).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let mut items: Vec<serde_json::Value> = Vec::new();
    for a in &alerts {
        let product = products_service::get_by_id(&state, a.product_id)
            .await
            .ok()
            .flatten();

        let last_event = if a.triggered_at.is_some() {
            alerts_service::latest_event(&state, a.id).await.ok().flatten()
        } else {
            None
        };

        items.push(json!({
            "id": a.id.to_hex(),
            "product_name": product.as_ref().map(|p| p.name.clone()),
            "product_slug": product.as_ref().map(|p| p.slug.clone()),
            "target_price": fmt_cents(a.target_price_cents),
            "is_active": a.is_active,
            "triggered": a.triggered_at.is_some(),
            "trigger_price": last_event.as_ref().map(|e| fmt_cents(e.price_cents)),
            "trigger_store": last_event.as_ref().and_then(|e| e.store_name.clone()),
        }));
    }

    let ctx = json!({ "alerts": items, "has_alerts": !items.is_empty() });

    let html = state
        .hbs
        .render("partials/alerts_list", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

// ---------------- Mutations ----------------

#[derive(Deserialize)]
pub struct CreateAlertForm {
    #[serde(rename = "targetPrice")]
    pub target_price: String,
}

// POST /alerts/:slug
pub async fn post_create_alert(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<CreateAlertForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Some(target_price_cents) = parse_target_price(&form.target_price) else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-danger small">Enter a valid target price.</div>"#.to_string()),
        )
            .into_response();
    };

    let product = match products_service::get_by_slug(&state, &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html(r#"<div class="text-danger small">Product not found.</div>"#.to_string()),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    match alerts_service::create_alert(&state, u.id, product.id, target_price_cents).await {
        Ok(_) => (
            StatusCode::OK,
            Html(format!(
                r#"<div class="text-success small">Alert set for {} at {}.</div>"#,
                product.name,
                fmt_cents(target_price_cents)
            )),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub struct ToggleAlertForm {
    pub active: String,
}

// POST /alerts/by-id/:id/toggle
pub async fn post_toggle_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ToggleAlertForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(alert_id) = ObjectId::parse_str(&id) else {
        return (StatusCode::BAD_REQUEST, Html("invalid id".to_string())).into_response();
    };

    let active = form.active == "true" || form.active == "1";

    match alerts_service::set_active(&state, u.id, alert_id, active).await {
        Ok(true) => get_alerts_list(State(state), Some(Extension(u))).await,
        Ok(false) => (StatusCode::NOT_FOUND, Html("alert not found".to_string())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}

// POST /alerts/by-id/:id/rearm
pub async fn post_rearm_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(alert_id) = ObjectId::parse_str(&id) else {
        return (StatusCode::BAD_REQUEST, Html("invalid id".to_string())).into_response();
    };

    match alerts_service::rearm_alert(&state, u.id, alert_id).await {
        Ok(true) => get_alerts_list(State(state), Some(Extension(u))).await,
        Ok(false) => (StatusCode::NOT_FOUND, Html("alert not found".to_string())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}

// POST /alerts/by-id/:id/delete
pub async fn post_delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let Ok(alert_id) = ObjectId::parse_str(&id) else {
        return (StatusCode::BAD_REQUEST, Html("invalid id".to_string())).into_response();
    };

    match alerts_service::delete_alert(&state, u.id, alert_id).await {
        Ok(true) => get_alerts_list(State(state), Some(Extension(u))).await,
        Ok(false) => (StatusCode::NOT_FOUND, Html("alert not found".to_string())).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}
