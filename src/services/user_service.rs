use bcrypt::{hash, verify, DEFAULT_COST};
use mongodb::bson::{doc, oid::ObjectId};

use crate::{models::User, AppState};

use super::auth_service::{self, FieldErrors};

pub async fn change_email(state: &AppState, user_id: ObjectId, new_email: &str) -> Result<(), FieldErrors> {
    let mut errs = FieldErrors::new();

    let new_email = auth_service::normalize_email(new_email);

    let users = state.db.collection::<User>("users");

    if let Err(e) = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "email": new_email.as_str() } },
            None,
        )
        .await
    {
        let msg = e.to_string();
        if msg.contains("E11000") {
            errs.insert("email".into(), "This email is already in use.".into());
        } else {
            errs.insert("_form".into(), format!("db error: {e}"));
        }
        return Err(errs);
    }

    Ok(())
}

pub async fn change_password(
    state: &AppState,
    user_id: ObjectId,
    current_password: &str,
    new_password: &str,
) -> Result<(), FieldErrors> {
    let mut errs = FieldErrors::new();

    let users = state.db.collection::<User>("users");

    let db_user = match users.find_one(doc! { "_id": user_id }, None).await {
        Ok(Some(u)) => u,
        _ => {
            errs.insert("_form".into(), "User not found.".into());
            return Err(errs);
        }
    };

    if !verify(current_password, &db_user.password_hash).unwrap_or(false) {
        errs.insert("current_password".into(), "Current password is incorrect.".into());
        return Err(errs);
    }

    let pw_hash = match hash(new_password, DEFAULT_COST) {
        Ok(h) => h,
        Err(_) => {
            errs.insert("_form".into(), "Could not update password.".into());
            return Err(errs);
        }
    };

    if let Err(e) = users
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "password_hash": pw_hash } },
            None,
        )
        .await
    {
        errs.insert("_form".into(), format!("db error: {e}"));
        return Err(errs);
    }

    Ok(())
}
