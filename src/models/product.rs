use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductType {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "MOTHERBOARD")]
    Motherboard,
}

impl ProductType {
    pub fn parse(s: &str) -> Option<ProductType> {
        match s.to_uppercase().as_str() {
            "CPU" => Some(ProductType::Cpu),
            "GPU" => Some(ProductType::Gpu),
            "MOTHERBOARD" => Some(ProductType::Motherboard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Cpu => "CPU",
            ProductType::Gpu => "GPU",
            ProductType::Motherboard => "MOTHERBOARD",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,
    // URL-safe unique identifier
    pub slug: String,
    pub brand: String,
    pub product_type: ProductType,

    // Free-form per-type specs (cores, socket, vram, chipset, ...)
    #[serde(default)]
    pub specs: Option<Document>,

    // Derived offer cache. Owned by the offer aggregator; all three price
    // fields are null when the product has no offers.
    #[serde(default)]
    pub best_price_cents: Option<i64>,
    #[serde(default)]
    pub worst_price_cents: Option<i64>,
    #[serde(default)]
    pub offer_score: Option<f64>,
    #[serde(default)]
    pub last_price_check: Option<i64>,
}
