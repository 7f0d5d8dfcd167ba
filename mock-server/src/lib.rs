//! In-memory stand-in for the auction backend.
//!
//! Serves the same `/api` surface as the real backend, trailing slashes and
//! `{status, message, value}` envelopes included, so the client crate can be
//! exercised end to end. Sessions are a `sessionid` cookie holding the user
//! id; this is a test double, not an auth scheme.

pub mod error;
pub mod handlers;
pub mod store;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::Multipart,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub use error::MockError;
pub use store::{Item, ItemQuery, Store, User, SEED_PASSWORD};

use error::FieldErrors;

pub const SESSION_COOKIE: &str = "sessionid";

pub type Db = Arc<RwLock<Store>>;

/// App over a freshly seeded store.
pub fn app() -> Router {
    app_with_store(Store::seeded())
}

pub fn app_with_store(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/health/", get(handlers::health))
        .route("/auth/login/", post(handlers::login))
        .route("/auth/logout/", post(handlers::logout))
        .route("/api/profile/", get(handlers::get_profile).put(handlers::update_profile))
        .route("/api/users/{user_id}/", get(handlers::get_user).put(handlers::update_user))
        .route("/api/items/", get(handlers::list_items).post(handlers::create_item))
        .route("/api/items/{item_id}/", get(handlers::get_item).put(handlers::update_item))
        .route("/api/items/{item_id}/bid/", put(handlers::bid_item))
        .route(
            "/api/items/{item_id}/queries/",
            get(handlers::list_queries).post(handlers::create_query),
        )
        .route(
            "/api/items/{item_id}/queries/{query_id}/",
            get(handlers::get_query).put(handlers::update_query),
        )
        .route(
            "/api/items/{item_id}/queries/{query_id}/answer/",
            put(handlers::answer_query),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `{"status": "OK", "value": value}`.
pub(crate) fn ok<T: Serialize>(value: T) -> Json<Value> {
    Json(json!({"status": "OK", "value": value}))
}

/// `{"status": "OK"}` with no value, as the backend answers profile updates.
pub(crate) fn ok_empty() -> Json<Value> {
    Json(json!({"status": "OK"}))
}

/// Logged-in user id, if the session cookie names an existing user.
pub(crate) fn session_user(jar: &CookieJar, store: &Store) -> Option<u64> {
    let id = jar.get(SESSION_COOKIE)?.value().parse().ok()?;
    store.users.contains_key(&id).then_some(id)
}

pub(crate) fn require_user(jar: &CookieJar, store: &Store) -> Result<u64, MockError> {
    session_user(jar, store).ok_or(MockError::Unauthenticated)
}

/// A decoded multipart body. Files are reduced to their names; the mock
/// does not serve media.
#[derive(Debug, Default)]
pub(crate) struct FormInput {
    text: HashMap<String, String>,
    files: HashMap<String, String>,
}

impl FormInput {
    pub(crate) async fn read(mut multipart: Multipart) -> Result<Self, MockError> {
        let mut form = FormInput::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                // Browsers send an empty part for an untouched file input.
                Some(file_name) if !file_name.is_empty() => {
                    field.bytes().await?;
                    form.files.insert(name, file_name);
                }
                Some(_) => {}
                None => {
                    let value = field.text().await?;
                    form.text.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    pub(crate) fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    /// Non-blank text for `name`, or a "required" error recorded.
    pub(crate) fn required(&self, name: &str, errors: &mut FieldErrors) -> Option<String> {
        match self.text(name).map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                errors.add(name, "This field is required.");
                None
            }
        }
    }

    /// Media path of an uploaded file, e.g. `/media/lamp.png`.
    pub(crate) fn media_path(&self, name: &str) -> Option<String> {
        self.files.get(name).map(|f| format!("/media/{f}"))
    }
}
