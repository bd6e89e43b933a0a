use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::user_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/me", get(user_controller::me))
        .route("/settings", get(user_controller::get_settings))
        .route("/settings/email", post(user_controller::post_change_email))
        .route("/settings/password", post(user_controller::post_change_password))
}
