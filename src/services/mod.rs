pub mod db_init;
pub mod alert_monitor;

pub mod auth_service;
pub mod user_service;
pub mod products_service;
pub mod offer_aggregator;
pub mod alert_evaluator;
pub mod alerts_service;
pub mod favorites_service;
