use chrono::{Duration, Utc};
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{
    models::{Offer, PriceSnapshot, Product, ProductType},
    AppState,
};

pub async fn list_products(
    state: &AppState,
    product_type: Option<ProductType>,
    brand: Option<&str>,
) -> Result<Vec<Product>, String> {
    let products = state.db.collection::<Product>("products");

    let mut filter = doc! {};
    if let Some(t) = product_type {
        filter.insert("product_type", t.as_str());
    }
    if let Some(b) = brand {
        if !b.trim().is_empty() {
            filter.insert("brand", b.trim());
        }
    }

    let find_opts = FindOptions::builder().sort(doc! { "name": 1 }).build();

    let mut cursor = products
        .find(filter, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Product> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Top deals for the home page: highest discount score first, only products
/// with a computed cache.
pub async fn hottest_deals(state: &AppState, limit: i64) -> Result<Vec<Product>, String> {
    let products = state.db.collection::<Product>("products");

    let find_opts = FindOptions::builder()
        .sort(doc! { "offer_score": -1 })
        .limit(limit)
        .build();

    let mut cursor = products
        .find(doc! { "offer_score": { "$gt": 0.0 } }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Product> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

pub async fn get_by_slug(state: &AppState, slug: &str) -> Result<Option<Product>, String> {
    state
        .db
        .collection::<Product>("products")
        .find_one(doc! { "slug": slug }, None)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_by_id(state: &AppState, id: ObjectId) -> Result<Option<Product>, String> {
    state
        .db
        .collection::<Product>("products")
        .find_one(doc! { "_id": id }, None)
        .await
        .map_err(|e| e.to_string())
}

/// A product's current offers, cheapest first.
pub async fn list_offers(state: &AppState, product_id: ObjectId) -> Result<Vec<Offer>, String> {
    let offers = state.db.collection::<Offer>("offers");

    let find_opts = FindOptions::builder()
        .sort(doc! { "price_cents": 1 })
        .build();

    let mut cursor = offers
        .find(doc! { "product_id": product_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Offer> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Price snapshots from the last `days` days, oldest first.
pub async fn price_history(
    state: &AppState,
    product_id: ObjectId,
    days: i64,
) -> Result<Vec<PriceSnapshot>, String> {
    let snapshots = state.db.collection::<PriceSnapshot>("snapshots");

    let since = (Utc::now() - Duration::days(days)).timestamp();

    let find_opts = FindOptions::builder().sort(doc! { "date": 1 }).build();

    let mut cursor = snapshots
        .find(
            doc! { "product_id": product_id, "date": { "$gte": since } },
            find_opts,
        )
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<PriceSnapshot> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}
