use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{models::Favorite, AppState};

pub async fn list_user_favorites(
    state: &AppState,
    user_id: ObjectId,
) -> Result<Vec<Favorite>, String> {
    let favorites = state.db.collection::<Favorite>("favorites");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = favorites
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Favorite> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

pub async fn is_favorite(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
) -> Result<bool, String> {
    let favorites = state.db.collection::<Favorite>("favorites");

    let found = favorites
        .find_one(doc! { "user_id": user_id, "product_id": product_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(found.is_some())
}

/// Idempotent: favoriting an already-favorited product keeps the original.
pub async fn add_favorite(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
) -> Result<(), String> {
    let favorites = state.db.collection::<Favorite>("favorites");

    if is_favorite(state, user_id, product_id).await? {
        return Ok(());
    }

    let fav = Favorite {
        id: ObjectId::new(),
        user_id,
        product_id,
        created_at: Utc::now().timestamp(),
    };

    favorites
        .insert_one(&fav, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

pub async fn remove_favorite(
    state: &AppState,
    user_id: ObjectId,
    product_id: ObjectId,
) -> Result<(), String> {
    let favorites = state.db.collection::<Favorite>("favorites");

    favorites
        .delete_one(doc! { "user_id": user_id, "product_id": product_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
