use axum::{Router, routing::get};
use crate::{AppState, controllers::products_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/products", get(products_controller::get_products_page))
        .route("/products/list", get(products_controller::get_products_list))
        .route("/products/:slug", get(products_controller::get_product_details))
        .route("/products/:slug/history", get(products_controller::get_price_history))
        .route("/cpu", get(products_controller::get_cpus_page))
        .route("/gpu", get(products_controller::get_gpus_page))
        .route("/motherboard", get(products_controller::get_motherboards_page))
}
