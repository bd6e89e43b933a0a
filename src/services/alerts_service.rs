use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{FindOneOptions, FindOptions};

use crate::{
    models::{PriceAlert, PriceAlertEvent},
    AppState,
};

pub async fn list_user_alerts(
    state: &AppState,
    user_id: ObjectId,
) -> Result<Vec<PriceAlert>, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = alerts
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<PriceAlert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Most recent firing of an alert, if it ever fired.
pub async fn latest_event(
    state: &AppState,
    alert_id: ObjectId,
) -> Result<Option<PriceAlertEvent>, String> {
    let events = state.db.collection::<PriceAlertEvent>("alert_events");

    let opts = FindOneOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    events
        .find_one(doc! { "alert_id": alert_id }, opts)
        .await
        .map_err(|e| e.to_string())
}

/// Create an alert, or rearm-and-reactivate the existing one for the same
/// (user, product, target price). New alerts start active and untriggered.
pub async fn create_alert(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
    target_price_cents: i64,
) -> Result<PriceAlert, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");
    let now = Utc::now().timestamp();

    let filter = doc! {
        "user_id": user_id,
        "product_id": product_id,
        "target_price_cents": target_price_cents,
    };

    if let Some(existing) = alerts
        .find_one(filter.clone(), None)
        .await
        .map_err(|e| e.to_string())?
    {
        alerts
            .update_one(
                doc! { "_id": existing.id },
                doc! { "$set": { "is_active": true, "triggered_at": Bson::Null } },
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        let _ = state.events_tx.send("alertsUpdated".to_string());

        return Ok(PriceAlert {
            is_active: true,
            triggered_at: None,
            ..existing
        });
    }

    let alert = PriceAlert {
        id: ObjectId::new(),
        user_id,
        product_id,
        target_price_cents,
        is_active: true,
        triggered_at: None,
        created_at: now,
    };

    alerts
        .insert_one(&alert, None)
        .await
        .map_err(|e| e.to_string())?;

    let _ = state.events_tx.send("alertsUpdated".to_string());

    Ok(alert)
}

/// User toggle; independent of trigger state.
pub async fn set_active(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
    active: bool,
) -> Result<bool, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");

    let res = alerts
        .update_one(
            doc! { "_id": alert_id, "user_id": user_id },
            doc! { "$set": { "is_active": active } },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    let _ = state.events_tx.send("alertsUpdated".to_string());

    Ok(res.matched_count > 0)
}

/// Clears the trigger timestamp only. Activation is a separate user toggle,
/// and no event is appended; only firing does that.
fn rearm_update() -> Document {
    doc! { "$set": { "triggered_at": Bson::Null } }
}

/// Clear `triggered_at` so the evaluator picks the alert up again.
pub async fn rearm_alert(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
) -> Result<bool, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");

    let res = alerts
        .update_one(
            doc! { "_id": alert_id, "user_id": user_id },
            rearm_update(),
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    let _ = state.events_tx.send("alertsUpdated".to_string());

    Ok(res.matched_count > 0)
}

/// Delete an alert and cascade its trigger events.
pub async fn delete_alert(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
) -> Result<bool, String> {
    let alerts = state.db.collection::<PriceAlert>("alerts");

    let owned = alerts
        .find_one(doc! { "_id": alert_id, "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    if owned.is_none() {
        return Ok(false);
    }

    state
        .db
        .collection::<PriceAlertEvent>("alert_events")
        .delete_many(doc! { "alert_id": alert_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    alerts
        .delete_one(doc! { "_id": alert_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    let _ = state.events_tx.send("alertsUpdated".to_string());

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearm_only_clears_the_trigger_timestamp() {
        let update = rearm_update();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get("triggered_at"), Some(&Bson::Null));
        assert!(!set.contains_key("is_active"));
        assert_eq!(set.len(), 1);
    }
}
