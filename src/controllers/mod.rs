pub mod home_controller;
pub mod auth_controller;
pub mod user_controller;
pub mod products_controller;
pub mod alerts_controller;
pub mod favorites_controller;
pub mod jobs_controller;
pub mod realtime_controller;
