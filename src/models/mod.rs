pub mod user;
pub mod product;
pub mod offer;
pub mod alert;
pub mod favorite;
pub mod snapshot;

pub use user::{CurrentUser, User};
pub use product::{Product, ProductType};
pub use offer::Offer;
pub use alert::{PriceAlert, PriceAlertEvent};
pub use favorite::Favorite;
pub use snapshot::PriceSnapshot;
