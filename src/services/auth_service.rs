use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use mongodb::bson::{doc, oid::ObjectId};

use crate::{models::User, AppState};

pub type FieldErrors = HashMap<String, String>;

const REGISTER_FAILED: &str = "There is a problem registering this user!";
const BAD_CREDENTIALS: &str = "Invalid email or password.";

#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Emails are stored lowercased so `User@Example.com` and `user@example.com`
/// resolve to the same account.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn form_error(msg: &str) -> FieldErrors {
    field_error("_form", msg)
}

fn field_error(field: &str, msg: &str) -> FieldErrors {
    let mut errs = FieldErrors::new();
    errs.insert(field.into(), msg.into());
    errs
}

pub fn make_jwt_with_days(state: &AppState, user_id: &ObjectId, days: i64) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

pub async fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, FieldErrors> {
    let email = normalize_email(email);

    let users = state.db.collection::<User>("users");

    let user = users
        .find_one(doc! { "email": email.as_str() }, None)
        .await
        .map_err(|_| form_error("Server error. Please try again."))?
        .ok_or_else(|| form_error(BAD_CREDENTIALS))?;

    if !verify(password, &user.password_hash).unwrap_or(false) {
        return Err(form_error(BAD_CREDENTIALS));
    }

    Ok(user)
}

/// Registers a new account and returns the stored user, ready for the
/// cookie-issuing flow in the controller.
pub async fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, FieldErrors> {
    let email = normalize_email(email);
    let username = username.trim();

    let users = state.db.collection::<User>("users");

    // One lookup covers both uniqueness checks.
    let taken = users
        .find_one(
            doc! { "$or": [ { "email": email.as_str() }, { "username": username } ] },
            None,
        )
        .await
        .map_err(|_| form_error(REGISTER_FAILED))?;

    if let Some(existing) = taken {
        if existing.email == email {
            return Err(field_error("email", "Email has already been taken!"));
        }
        return Err(field_error("username", "Username has already been taken!"));
    }

    let password_hash = hash(password, DEFAULT_COST).map_err(|_| form_error(REGISTER_FAILED))?;

    let user = User {
        id: ObjectId::new(),
        email,
        username: username.to_string(),
        password_hash,
        created_at: Utc::now().timestamp(),
    };

    users
        .insert_one(&user, None)
        .await
        .map_err(|_| form_error(REGISTER_FAILED))?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  User@Example.COM  "), "user@example.com");
        assert_eq!(normalize_email("plain@example.com"), "plain@example.com");
    }

    #[test]
    fn error_helpers_target_the_right_field() {
        let errs = field_error("email", "Email has already been taken!");
        assert_eq!(
            errs.get("email").map(String::as_str),
            Some("Email has already been taken!")
        );

        let errs = form_error(BAD_CREDENTIALS);
        assert_eq!(errs.get("_form").map(String::as_str), Some(BAD_CREDENTIALS));
    }
}
