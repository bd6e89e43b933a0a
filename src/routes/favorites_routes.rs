use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::favorites_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/favorites", get(favorites_controller::get_favorites_page))
        .route("/favorites/list", get(favorites_controller::get_favorites_list))
        .route("/favorites/:slug", post(favorites_controller::post_add_favorite))
        .route("/favorites/:slug/delete", post(favorites_controller::post_remove_favorite))
}
