use axum::{
    Form,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    models::CurrentUser,
    render,
    services::user_service,
};

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn is_valid_email(email: &str) -> bool {
    let re = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    re.is_match(email)
}

// GET /me
pub async fn me(user: Option<Extension<CurrentUser>>) -> impl IntoResponse {
    match user {
        Some(Extension(u)) => (StatusCode::OK, axum::Json(u)).into_response(),
        None => (StatusCode::UNAUTHORIZED, Html("not logged in".to_string())).into_response(),
    }
}

// ---------------- Settings ----------------

// GET /settings
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<Extension<CurrentUser>>,
) -> Response {
    let current_email = user
        .as_ref()
        .map(|Extension(u)| u.email.as_str())
        .unwrap_or("");

    let body = state
        .hbs
        .render("pages/settings", &json!({ "values": { "email": current_email } }))
        .unwrap_or_else(|e| format!("template error: {e}"));

    if is_htmx(&headers) {
        return (StatusCode::OK, Html(body)).into_response();
    }

    let user_ref = user.as_ref().map(|Extension(u)| u);

    match render::render_full(&state, "Settings", body, user_ref) {
        Ok(page) => (StatusCode::OK, Html(page)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}

#[derive(Deserialize)]
pub struct ChangeEmailForm {
    pub email: String,
}

// POST /settings/email
pub async fn post_change_email(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ChangeEmailForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Html(r#"<div class="text-danger">Error getting user</div>"#.to_string()),
        )
            .into_response();
    };

    let email = form.email.trim().to_lowercase();

    let mut errors = serde_json::Map::new();
    if email.is_empty() {
        errors.insert("email".into(), json!("Email is required."));
    } else if !is_valid_email(&email) {
        errors.insert("email".into(), json!("Invalid email."));
    }

    if errors.is_empty() {
        if let Err(errs) = user_service::change_email(&state, u.id, &email).await {
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
        }
    }

    let succ = if errors.is_empty() { "Email updated." } else { "" };

    let html = state
        .hbs
        .render(
            "partials/change_email",
            &json!({
                "values": { "email": email },
                "errors": errors,
                "succ": succ
            }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}

#[derive(Deserialize)]
pub struct ChangePasswordForm {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    pub password: String,

    #[serde(default, rename = "rePassword")]
    pub re_password: String,
}

// POST /settings/password
pub async fn post_change_password(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Form(form): Form<ChangePasswordForm>,
) -> Response {
    let Some(Extension(u)) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Html(r#"<div class="text-danger">Error getting user</div>"#.to_string()),
        )
            .into_response();
    };

    let mut errors = serde_json::Map::new();

    if form.password.len() < 8 {
        errors.insert("password".into(), json!("Password must be at least 8 characters."));
    } else if form.password != form.re_password {
        errors.insert("rePassword".into(), json!("Passwords do not match."));
    }

    if errors.is_empty() {
        if let Err(errs) =
            user_service::change_password(&state, u.id, &form.current_password, &form.password).await
        {
            for (k, v) in errs {
                errors.insert(k, json!(v));
            }
        }
    }

    let succ = if errors.is_empty() { "Password updated." } else { "" };

    let html = state
        .hbs
        .render(
            "partials/change_password",
            &json!({
                "errors": errors,
                "succ": succ
            }),
        )
        .unwrap_or_else(|e| format!("template error: {e}"));

    (StatusCode::OK, Html(html)).into_response()
}
