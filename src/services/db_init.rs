use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique email
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // products: unique slug, plus listing filters
    {
        let col = db.collection::<mongodb::bson::Document>("products");
        let model = IndexModel::builder()
            .keys(doc! { "slug": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;

        let model = IndexModel::builder()
            .keys(doc! { "product_type": 1, "brand": 1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    // offers: best-offer lookup per product sorts by price
    {
        let col = db.collection::<mongodb::bson::Document>("offers");
        let model = IndexModel::builder()
            .keys(doc! { "product_id": 1, "price_cents": 1 })
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // alerts: evaluator scan (armed alerts) and per-user listing
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "is_active": 1, "triggered_at": 1 })
            .build();

        let _ = col.create_index(model, None).await;

        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    // alert_events: cascade delete + latest-event lookup
    {
        let col = db.collection::<mongodb::bson::Document>("alert_events");
        let model = IndexModel::builder()
            .keys(doc! { "alert_id": 1, "created_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    // favorites: unique per (user, product)
    {
        let col = db.collection::<mongodb::bson::Document>("favorites");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "product_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // snapshots: history queries per product, time-bounded
    {
        let col = db.collection::<mongodb::bson::Document>("snapshots");
        let model = IndexModel::builder()
            .keys(doc! { "product_id": 1, "date": 1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
