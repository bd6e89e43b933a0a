use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::{bson::oid::ObjectId, Client};
use pchubbr::{controllers::alerts_controller, config, templates, AppState};
use pchubbr::models::CurrentUser;
use tower::ServiceExt;

async fn test_state() -> AppState {
    let settings = config::load();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(16);

    AppState {
        hbs: templates::build_handlebars(),
        db,
        settings,
        events_tx,
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn test_user() -> CurrentUser {
    CurrentUser {
        id: ObjectId::new(),
        email: "test@example.com".to_string(),
        username: "test".to_string(),
    }
}

#[tokio::test]
async fn post_create_alert_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/alerts/:slug", post(alerts_controller::post_create_alert))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/alerts/amd-ryzen-5-5600")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("targetPrice=699,90"))
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = response_body_string(res).await;
    assert!(body.to_lowercase().contains("unauthorized"));
}

#[tokio::test]
async fn post_create_alert_invalid_price_renders_error() {
    let state = test_state().await;
    let app = Router::new()
        .route("/alerts/:slug", post(alerts_controller::post_create_alert))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/alerts/amd-ryzen-5-5600")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("targetPrice=notaprice"))
        .unwrap();

    // Authenticated user, so we hit the price parse branch, not unauthorized.
    req.extensions_mut().insert(test_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Enter a valid target price"));
}

#[tokio::test]
async fn post_toggle_alert_rejects_malformed_id() {
    let state = test_state().await;
    let app = Router::new()
        .route("/alerts/by-id/:id/toggle", post(alerts_controller::post_toggle_alert))
        .with_state(state);

    let mut req = Request::builder()
        .method("POST")
        .uri("/alerts/by-id/not-an-objectid/toggle")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("active=false"))
        .unwrap();

    req.extensions_mut().insert(test_user());

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_delete_alert_unauthorized_returns_401() {
    let state = test_state().await;
    let app = Router::new()
        .route("/alerts/by-id/:id/delete", post(alerts_controller::post_delete_alert))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/alerts/by-id/{}/delete", ObjectId::new().to_hex()))
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn parse_target_price_accepts_common_formats() {
    use alerts_controller::parse_target_price;

    assert_eq!(parse_target_price("R$ 1.234,56"), Some(123456));
    assert_eq!(parse_target_price("1234,56"), Some(123456));
    assert_eq!(parse_target_price("1234.56"), Some(123456));
    assert_eq!(parse_target_price("1234"), Some(123400));
    assert_eq!(parse_target_price("699,90"), Some(69990));
}

#[test]
fn parse_target_price_rejects_garbage_and_non_positive() {
    use alerts_controller::parse_target_price;

    assert_eq!(parse_target_price(""), None);
    assert_eq!(parse_target_price("abc"), None);
    assert_eq!(parse_target_price("0"), None);
    assert_eq!(parse_target_price("-10,00"), None);
}
