//! Batch evaluation of price alerts against current best offers.
//!
//! Runs from the background monitor and from `POST /jobs/check-alerts`.
//! Each alert is independent: one alert failing to resolve never aborts
//! the rest of the batch.

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::FindOneOptions;

use crate::{
    models::{Offer, PriceAlert, PriceAlertEvent},
    AppState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct EvaluationSummary {
    pub checked: u64,
    pub triggered: u64,
    pub errors: u64,
}

/// Per-alert outcome of one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fired,
    NotMet,
    // Product has no offers at all: nothing to compare against, no state
    // change. Still counts as checked.
    NoOffers,
}

/// Inclusive on purpose: a best offer exactly at the target price counts as
/// met (favors the user).
pub fn target_met(best_price_cents: i64, target_price_cents: i64) -> bool {
    best_price_cents <= target_price_cents
}

pub fn classify(best_price_cents: Option<i64>, target_price_cents: i64) -> Outcome {
    match best_price_cents {
        None => Outcome::NoOffers,
        Some(best) if target_met(best, target_price_cents) => Outcome::Fired,
        Some(_) => Outcome::NotMet,
    }
}

fn tally(summary: &mut EvaluationSummary, result: Result<Outcome, ()>) {
    summary.checked += 1;
    match result {
        Ok(Outcome::Fired) => summary.triggered += 1,
        Ok(Outcome::NotMet) | Ok(Outcome::NoOffers) => {}
        Err(()) => summary.errors += 1,
    }
}

/// Lowest-priced offer for a product, if it has any.
async fn best_offer(state: &AppState, product_id: ObjectId) -> Result<Option<Offer>, String> {
    let offers = state.db.collection::<Offer>("offers");

    let opts = FindOneOptions::builder()
        .sort(doc! { "price_cents": 1 })
        .build();

    offers
        .find_one(doc! { "product_id": product_id }, opts)
        .await
        .map_err(|e| e.to_string())
}

/// Matches only while `triggered_at` is still null, so two concurrent passes
/// fire the same alert at most once.
fn trigger_filter(alert_id: ObjectId) -> Document {
    doc! { "_id": alert_id, "triggered_at": Bson::Null }
}

fn trigger_update(now: i64) -> Document {
    doc! { "$set": { "triggered_at": now } }
}

/// The single event a firing appends, recording which offer met the target.
fn trigger_event(alert: &PriceAlert, offer: &Offer, now: i64) -> PriceAlertEvent {
    PriceAlertEvent {
        id: ObjectId::new(),
        alert_id: alert.id,
        price_cents: offer.price_cents,
        store_name: Some(offer.store_name.clone()),
        created_at: now,
    }
}

async fn fire_alert(state: &AppState, alert: &PriceAlert, offer: &Offer) -> Result<(), String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");
    let now = Utc::now().timestamp();

    let res = alerts
        .update_one(trigger_filter(alert.id), trigger_update(now), None)
        .await
        .map_err(|e| e.to_string())?;

    // Another pass won the race; it also wrote the event.
    if res.matched_count == 0 {
        return Ok(());
    }

    let event = trigger_event(alert, offer, now);

    state
        .db
        .collection::<PriceAlertEvent>("alert_events")
        .insert_one(&event, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

async fn evaluate_one(state: &AppState, alert: &PriceAlert) -> Result<Outcome, String> {
    let offer = match best_offer(state, alert.product_id).await? {
        Some(o) => o,
        None => return Ok(Outcome::NoOffers),
    };

    match classify(Some(offer.price_cents), alert.target_price_cents) {
        Outcome::Fired => {
            fire_alert(state, alert, &offer).await?;
            Ok(Outcome::Fired)
        }
        other => Ok(other),
    }
}

/// Scan every active, untriggered alert and fire those whose target has been
/// met by the current best offer. Returns the batch summary the job endpoint
/// reports.
pub async fn evaluate_all(state: &AppState) -> Result<EvaluationSummary, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");

    let mut cursor = alerts
        .find(doc! { "is_active": true, "triggered_at": Bson::Null }, None)
        .await
        .map_err(|e| e.to_string())?;

    let mut batch = Vec::new();
    while let Some(item) = cursor.next().await {
        batch.push(item.map_err(|e| e.to_string())?);
    }

    let mut summary = EvaluationSummary::default();

    for alert in &batch {
        let result = match evaluate_one(state, alert).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!("alert {} evaluation failed: {}", alert.id.to_hex(), e);
                Err(())
            }
        };
        tally(&mut summary, result);
    }

    if summary.triggered > 0 {
        let _ = state.events_tx.send("alertsUpdated".to_string());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_target_price_fires() {
        assert!(target_met(68000, 68000));
        assert_eq!(classify(Some(68000), 68000), Outcome::Fired);
    }

    #[test]
    fn one_cent_above_target_does_not_fire() {
        assert!(!target_met(68000, 67999));
        assert_eq!(classify(Some(68000), 67999), Outcome::NotMet);
    }

    #[test]
    fn below_target_fires() {
        assert_eq!(classify(Some(59900), 60000), Outcome::Fired);
    }

    #[test]
    fn missing_best_offer_is_a_skip() {
        assert_eq!(classify(None, 60000), Outcome::NoOffers);
    }

    #[test]
    fn summary_counts_skips_as_checked_not_errors() {
        // Three alerts: product without offers, target met, target not met.
        let mut summary = EvaluationSummary::default();
        tally(&mut summary, Ok(classify(None, 50000)));
        tally(&mut summary, Ok(classify(Some(48000), 50000)));
        tally(&mut summary, Ok(classify(Some(52000), 50000)));

        assert_eq!(
            summary,
            EvaluationSummary {
                checked: 3,
                triggered: 1,
                errors: 0
            }
        );
    }

    #[test]
    fn trigger_update_sets_timestamp_and_guards_on_null() {
        let alert_id = ObjectId::new();

        let filter = trigger_filter(alert_id);
        assert_eq!(filter.get_object_id("_id").unwrap(), alert_id);
        assert_eq!(filter.get("triggered_at"), Some(&Bson::Null));

        let update = trigger_update(1_700_000_000);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_i64("triggered_at").unwrap(), 1_700_000_000);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn firing_records_one_event_with_the_winning_offer() {
        let alert = PriceAlert {
            id: ObjectId::new(),
            user_id: ObjectId::new(),
            product_id: ObjectId::new(),
            target_price_cents: 70000,
            is_active: true,
            triggered_at: None,
            created_at: 0,
        };
        let offer = Offer {
            id: ObjectId::new(),
            product_id: alert.product_id,
            store_name: "Kabum".to_string(),
            price_cents: 68000,
            url: "https://example.com/ryzen-5-5600".to_string(),
        };

        let event = trigger_event(&alert, &offer, 1_700_000_000);
        assert_eq!(event.alert_id, alert.id);
        assert_eq!(event.price_cents, 68000);
        assert_eq!(event.store_name.as_deref(), Some("Kabum"));
        assert_eq!(event.created_at, 1_700_000_000);
    }

    #[test]
    fn lookup_failure_counts_as_error_and_checked() {
        let mut summary = EvaluationSummary::default();
        tally(&mut summary, Err(()));
        tally(&mut summary, Ok(Outcome::Fired));

        assert_eq!(
            summary,
            EvaluationSummary {
                checked: 2,
                triggered: 1,
                errors: 1
            }
        );
    }
}
