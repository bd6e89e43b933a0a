use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::Client;
use pchubbr::{controllers::jobs_controller, config, templates, AppState};
use tower::ServiceExt;

async fn test_state_with_secret(secret: &str) -> AppState {
    let mut settings = config::load();
    settings.cron_secret = secret.to_string();

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

#[tokio::test]
async fn check_alerts_without_token_returns_401() {
    let state = test_state_with_secret("topsecret").await;
    let app = Router::new()
        .route("/jobs/check-alerts", post(jobs_controller::post_check_alerts))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/jobs/check-alerts")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = response_body_string(res).await;
    assert!(body.contains("Unauthorized"));
}

#[tokio::test]
async fn check_alerts_with_wrong_token_returns_401() {
    let state = test_state_with_secret("topsecret").await;
    let app = Router::new()
        .route("/jobs/check-alerts", post(jobs_controller::post_check_alerts))
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/jobs/check-alerts")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn calculate_offers_without_token_returns_401() {
    let state = test_state_with_secret("topsecret").await;
    let app = Router::new()
        .route(
            "/jobs/calculate-offers",
            post(jobs_controller::post_calculate_offers),
        )
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/jobs/calculate-offers")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
