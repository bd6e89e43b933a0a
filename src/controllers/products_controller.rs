use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{CurrentUser, Product, ProductType},
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

fn fmt_cents(cents: i64) -> String {
    format!("{},{:02}", cents / 100, (cents % 100).abs())
}

fn product_ctx(p: &Product) -> serde_json::Value {
    json!({
        "id": p.id.to_hex(),
        "name": p.name,
        "slug": p.slug,
        "brand": p.brand,
        "product_type": p.product_type.as_str(),
        "best_price": p.best_price_cents.map(fmt_cents),
        "worst_price": p.worst_price_cents.map(fmt_cents),
        "offer_score": p.offer_score.map(|s| format!("{:.1}", s)),
        "has_prices": p.best_price_cents.is_some(),
    })
}

#[derive(Deserialize)]
pub struct ListingQuery {
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub brand: Option<String>,
}

async fn listing_ctx(
    state: &AppState,
    product_type: Option<ProductType>,
    brand: Option<&str>,
) -> serde_json::Value {
    match products_service::list_products(state, product_type, brand).await {
        Ok(products) => {
            let items: Vec<serde_json::Value> = products.iter().map(product_ctx).collect();
            json!({
                "products": items,
                "has_products": !items.is_empty(),
                "type_filter": product_type.map(|t| t.as_str()),
                "brand_filter": brand.unwrap_or(""),
                "error": serde_json::Value::Null,
            })
        }
        Err(e) => {
            tracing::error!("product listing failed: {}", e);
            json!({
                "products": [],
                "has_products": false,
                "error": "Catalog unavailable right now.",
            })
        }
    }
}

async fn render_listing(
    state: AppState,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
    product_type: Option<ProductType>,
    brand: Option<String>,
    title: &str,
) -> Response {
    let ctx = listing_ctx(&state, product_type, brand.as_deref()).await;

    let body = state
        .hbs
        .render("pages/products", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, title, body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

// GET /products?type=GPU&brand=...
pub async fn get_products_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let product_type = query.product_type.as_deref().and_then(ProductType::parse);
    render_listing(state, headers, user, product_type, query.brand, "Products").await
}

// GET /cpu | /gpu | /motherboard
pub async fn get_cpus_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    render_listing(state, headers, user, Some(ProductType::Cpu), query.brand, "CPUs").await
}

pub async fn get_gpus_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    render_listing(state, headers, user, Some(ProductType::Gpu), query.brand, "GPUs").await
}

pub async fn get_motherboards_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListingQuery>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    render_listing(
        state,
        headers,
        user,
        Some(ProductType::Motherboard),
        query.brand,
        "Motherboards",
    )
    .await
}

// GET /products/list?type=...&brand=...  (filter partial)
pub async fn get_products_list(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let product_type = query.product_type.as_deref().and_then(ProductType::parse);
    let ctx = listing_ctx(&state, product_type, query.brand.as_deref()).await;

    let html = state
        .hbs
        .render("partials/product_list", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

// GET /products/:slug
pub async fn get_product_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let product = match products_service::get_by_slug(&state, &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return super::home_controller::not_found(State(state), headers, user)
                .await
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

    let offers = products_service::list_offers(&state, product.id)
        .await
        .unwrap_or_default();

    let offer_items: Vec<serde_json::Value> = offers
        .iter()
        .map(|o| {
            json!({
                "store_name": o.store_name,
                "price": fmt_cents(o.price_cents),
                "url": o.url,
            })
        })
        .collect();

    let is_favorite = match user.as_ref() {
        Some(Extension(u)) => favorites_service::is_favorite(&state, u.id, product.id)
            .await
            .unwrap_or(false),
        None => false,
    };

    let mut ctx = product_ctx(&product);
    if let Some(map) = ctx.as_object_mut() {
        map.insert("offers".into(), json!(offer_items));
        map.insert("has_offers".into(), json!(!offer_items.is_empty()));
        map.insert("is_favorite".into(), json!(is_favorite));
        map.insert(
            "specs".into(),
            product
                .specs
                .as_ref()
                .map(|d| {
                    let entries: Vec<serde_json::Value> = d
                        .iter()
                        .map(|(k, v)| json!({ "key": k, "value": v.to_string().trim_matches('"') }))
                        .collect();
                    json!(entries)
                })
                .unwrap_or(serde_json::Value::Null),
        );
    }

    let body = state
        .hbs
        .render("pages/details", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);
    match render::render_full(&state, &product.name, body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

// GET /products/:slug/history?days=30  (chart partial)
pub async fn get_price_history(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let days = query.days.unwrap_or(30).clamp(1, 365);

    let product = match products_service::get_by_slug(&state, &slug).await {
        Ok(Some(p)) => p,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html(r#"<div class="text-muted small">Product not found.</div>"#.to_string()),
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

    let snapshots = match products_service::price_history(&state, product.id, days).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("db error: {e}")),
            )
                .into_response();
        }
    };

    let points: Vec<serde_json::Value> = snapshots
        .iter()
        .map(|s| {
            json!({
                "date": s.date,
                "store_name": s.store_name,
                "price": fmt_cents(s.price_cents),
                "price_cents": s.price_cents,
            })
        })
        .collect();

    let ctx = json!({
        "slug": product.slug,
        "days": days,
        "points": points,
        "has_points": !points.is_empty(),
    });

    let html = state
        .hbs
        .render("partials/price_history", &ctx)
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}
