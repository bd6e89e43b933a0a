use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One store's current price for a product. Written by the external
/// ingestion pipeline; this app only reads these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub product_id: ObjectId,
    pub store_name: String,
    pub price_cents: i64,
    pub url: String,
}
