//! Recomputes the denormalized offer cache on products.
//!
//! The cache (`best_price_cents`, `worst_price_cents`, `offer_score`,
//! `last_price_check`) is always a pure function of the product's current
//! offers; this module is its only writer. Both the bulk job and the
//! per-product path go through [`aggregate`].

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};

use crate::{models::{Offer, Product}, AppState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferStats {
    pub best_price_cents: i64,
    pub worst_price_cents: i64,
    pub offer_score: f64,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct RecomputeSummary {
    pub processed: u64,
    pub updated: u64,
    pub errors: u64,
}

/// Reduce an offer price list to best/worst price and discount score.
///
/// Empty input means "no pricing data" and yields `None`, which is distinct
/// from a 0% discount. The score is the percentage spread between worst and
/// best price, unrounded; degenerate cases (single offer, non-positive
/// worst price) score 0 rather than dividing by zero.
pub fn aggregate(prices: &[i64]) -> Option<OfferStats> {
    let first = *prices.first()?;

    let mut best = first;
    let mut worst = first;
    for &p in &prices[1..] {
        if p < best {
            best = p;
        }
        if p > worst {
            worst = p;
        }
    }

    let offer_score = if worst > 0 && worst > best {
        (worst - best) as f64 / worst as f64 * 100.0
    } else {
        0.0
    };

    Some(OfferStats {
        best_price_cents: best,
        worst_price_cents: worst,
        offer_score,
    })
}

async fn offer_prices(state: &AppState, product_id: ObjectId) -> Result<Vec<i64>, String> {
    let offers = state.db.collection::<Offer>("offers");

    let mut cursor = offers
        .find(doc! { "product_id": product_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    let mut prices = Vec::new();
    while let Some(item) = cursor.next().await {
        prices.push(item.map_err(|e| e.to_string())?.price_cents);
    }

    Ok(prices)
}

fn cache_update(stats: Option<OfferStats>, now: i64) -> mongodb::bson::Document {
    match stats {
        Some(s) => doc! {
            "$set": {
                "best_price_cents": s.best_price_cents,
                "worst_price_cents": s.worst_price_cents,
                "offer_score": s.offer_score,
                "last_price_check": now,
            }
        },
        None => doc! {
            "$set": {
                "best_price_cents": Bson::Null,
                "worst_price_cents": Bson::Null,
                "offer_score": Bson::Null,
                "last_price_check": now,
            }
        },
    }
}

/// Recompute one product's offer cache. An id that resolves to nothing is a
/// no-op (the update matches zero documents), not an error.
pub async fn recompute_product(state: &AppState, product_id: ObjectId) -> Result<(), String> {
    let prices = offer_prices(state, product_id).await?;
    let update = cache_update(aggregate(&prices), Utc::now().timestamp());

    state
        .db
        .collection::<Product>("products")
        .update_one(doc! { "_id": product_id }, update, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// Bulk pass over every product. A single product's failure is counted and
/// logged, never aborts the batch.
pub async fn recompute_all(state: &AppState) -> Result<RecomputeSummary, String> {
    let products = state.db.collection::<Product>("products");

    let mut cursor = products
        .find(doc! {}, None)
        .await
        .map_err(|e| e.to_string())?;

    let mut ids = Vec::new();
    while let Some(item) = cursor.next().await {
        ids.push(item.map_err(|e| e.to_string())?.id);
    }

    let mut summary = RecomputeSummary::default();

    for id in ids {
        summary.processed += 1;

        match recompute_product(state, id).await {
            Ok(()) => summary.updated += 1,
            Err(e) => {
                summary.errors += 1;
                tracing::warn!("offer recompute failed for {}: {}", id.to_hex(), e);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_price_list_has_no_stats() {
        assert_eq!(aggregate(&[]), None);
    }

    #[test]
    fn computes_min_and_max_exactly() {
        let stats = aggregate(&[70000, 68000, 90000]).unwrap();
        assert_eq!(stats.best_price_cents, 68000);
        assert_eq!(stats.worst_price_cents, 90000);
    }

    #[test]
    fn score_is_unrounded_percentage_spread() {
        let stats = aggregate(&[70000, 68000, 90000]).unwrap();
        let expected = (90000.0 - 68000.0) / 90000.0 * 100.0;
        assert_eq!(stats.offer_score, expected);
        assert!((stats.offer_score - 24.444444444444443).abs() < 1e-9);
    }

    #[test]
    fn single_offer_scores_zero() {
        let stats = aggregate(&[50000]).unwrap();
        assert_eq!(stats.best_price_cents, 50000);
        assert_eq!(stats.worst_price_cents, 50000);
        assert_eq!(stats.offer_score, 0.0);
    }

    #[test]
    fn identical_prices_score_zero() {
        let stats = aggregate(&[30000, 30000, 30000]).unwrap();
        assert_eq!(stats.offer_score, 0.0);
    }

    #[test]
    fn non_positive_worst_price_scores_zero() {
        // Defunct listings sometimes ingest as zero; never divide by it.
        let stats = aggregate(&[0, 0]).unwrap();
        assert_eq!(stats.offer_score, 0.0);

        let stats = aggregate(&[-100, -50]).unwrap();
        assert_eq!(stats.best_price_cents, -100);
        assert_eq!(stats.worst_price_cents, -50);
        assert_eq!(stats.offer_score, 0.0);
    }

    #[test]
    fn empty_offers_write_null_cache_fields() {
        let update = cache_update(None, 1_700_000_000);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get("best_price_cents"), Some(&Bson::Null));
        assert_eq!(set.get("worst_price_cents"), Some(&Bson::Null));
        assert_eq!(set.get("offer_score"), Some(&Bson::Null));
        assert_eq!(set.get_i64("last_price_check").unwrap(), 1_700_000_000);
    }

    #[test]
    fn non_empty_offers_write_all_cache_fields() {
        let stats = aggregate(&[68000, 90000]);
        let update = cache_update(stats, 1_700_000_000);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_i64("best_price_cents").unwrap(), 68000);
        assert_eq!(set.get_i64("worst_price_cents").unwrap(), 90000);
        assert!(set.get_f64("offer_score").unwrap() > 0.0);
    }
}
