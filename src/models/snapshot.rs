use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Daily per-store price point, kept by the ingestion pipeline. Feeds the
/// 30-day history chart on the product details page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSnapshot {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub product_id: ObjectId,
    pub store_name: String,
    pub price_cents: i64,

    // unix seconds, midday of the sampled day
    pub date: i64,
}
