use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub product_id: ObjectId,

    pub target_price_cents: i64,

    pub is_active: bool,
    // Null while armed; set exactly when the alert fires.
    #[serde(default)]
    pub triggered_at: Option<i64>,

    pub created_at: i64,
}

/// Append-only record of one firing. Created only on the
/// untriggered -> triggered transition, removed only when the parent
/// alert is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAlertEvent {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub alert_id: ObjectId,

    pub price_cents: i64,
    #[serde(default)]
    pub store_name: Option<String>,

    pub created_at: i64,
}
