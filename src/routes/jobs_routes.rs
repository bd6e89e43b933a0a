use axum::{Router, routing::post};
use crate::{AppState, controllers::jobs_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/jobs/calculate-offers",
            post(jobs_controller::post_calculate_offers).get(jobs_controller::get_calculate_offers),
        )
        .route("/jobs/check-alerts", post(jobs_controller::post_check_alerts))
}
