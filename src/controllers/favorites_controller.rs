use axum::{
    extract::{Extension, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::json;

use crate::{
    models::CurrentUser,
    render,
    services::{favorites_service, products_service},
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

// GET /favorites
pub async fn get_favorites_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let body = state
        .hbs
        .render("pages/favorites", &json!({}))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, "Favorites", body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /favorites/list
pub async fn get_favorites_list(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (
            StatusCode::OK,
            Html(r#"<div class="text-muted small">Log in to see favorites.</div>"#.to_string()),
        )
            .into_response();
    };

    let favorites = match favorites_service::list_user_favorites(&state, u.id).await {
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
    for f in &favorites {
        let Some(product) = products_service::get_by_id(&state, f.product_id)
            .await
            .ok()
            .flatten()
        else {
            continue;
        };

        items.push(json!({
            "name": product.name,
            "slug": product.slug,
            "product_type": product.product_type.as_str(),
            "best_price": product.best_price_cents.map(fmt_cents),
        }));
    }

    let ctx = json!({ "favorites": items, "has_favorites": !items.is_empty() });

    let html = state
        .hbs
        .render("partials/favorites_list", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

// POST /favorites/:slug
pub async fn post_add_favorite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let product = match products_service::get_by_slug(&state, &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, Html("product not found".to_string())).into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    match favorites_service::add_favorite(&state, u.id, product.id).await {
        Ok(()) => (
            StatusCode::OK,
            Html(r#"<span class="text-warning">&#9733;</span>"#.to_string()),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}

// POST /favorites/:slug/delete
pub async fn post_remove_favorite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let Some(Extension(u)) = user else {
        return unauthorized_snippet();
    };

    let product = match products_service::get_by_slug(&state, &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, Html("product not found".to_string())).into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    match favorites_service::remove_favorite(&state, u.id, product.id).await {
        Ok(()) => get_favorites_list(State(state), Some(Extension(u))).await,
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("db error: {e}")),
        )
            .into_response(),
    }
}
