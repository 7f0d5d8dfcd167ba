//! Route handlers. Permission checks and validation messages follow the
//! real backend so clients see the same failures.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Form, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::{FieldErrors, MockError};
use crate::store::{parse_dob, parse_end_date, ItemRecord, Price, QueryRecord};
use crate::{ok, ok_empty, require_user, session_user, Db, FormInput, SESSION_COOKIE};

type Reply = Result<Json<Value>, MockError>;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// `POST /auth/login/`: start a session for valid credentials.
pub async fn login(
    State(db): State<Db>,
    jar: CookieJar,
    Form(input): Form<LoginForm>,
) -> Result<(CookieJar, Json<Value>), MockError> {
    let store = db.read().await;
    let user = store
        .user_by_email(&input.email)
        .filter(|u| u.password == input.password)
        .ok_or_else(|| MockError::Unauthorized("Invalid credentials.".to_string()))?;
    info!(user_id = user.id, "login");
    let cookie = Cookie::build((SESSION_COOKIE, user.id.to_string())).path("/");
    Ok((jar.add(cookie), ok(store.user_view(user.id)?)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (jar.remove(Cookie::build(SESSION_COOKIE).path("/")), ok_empty())
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// `GET /api/profile/`: the logged-in user, or `null`.
pub async fn get_profile(State(db): State<Db>, jar: CookieJar) -> Reply {
    let store = db.read().await;
    match session_user(&jar, &store) {
        Some(id) => Ok(ok(store.user_view(id)?)),
        None => Ok(ok(Value::Null)),
    }
}

pub async fn update_profile(State(db): State<Db>, jar: CookieJar, multipart: Multipart) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    apply_user_form(&mut store, me, &form)?;
    Ok(ok_empty())
}

pub async fn get_user(State(db): State<Db>, jar: CookieJar, Path(user_id): Path<u64>) -> Reply {
    let store = db.read().await;
    require_user(&jar, &store)?;
    Ok(ok(store.user_view(user_id)?))
}

pub async fn update_user(
    State(db): State<Db>,
    jar: CookieJar,
    Path(user_id): Path<u64>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    if me != user_id {
        return Err(MockError::Forbidden(
            "You can only edit your own user profile".to_string(),
        ));
    }
    apply_user_form(&mut store, me, &form)?;
    Ok(ok_empty())
}

fn apply_user_form(store: &mut crate::Store, user_id: u64, form: &FormInput) -> Result<(), MockError> {
    let mut errors = FieldErrors::default();
    let email = form.required("email", &mut errors);
    let password = form.required("password", &mut errors);
    let dob = form.required("dob", &mut errors);

    if let Some(email) = &email {
        if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        } else if store.user_by_email(email).is_some_and(|u| u.id != user_id) {
            errors.add("email", "User with this Email already exists.");
        }
    }
    let dob = dob.and_then(|d| {
        let parsed = parse_dob(&d);
        if parsed.is_none() {
            errors.add("dob", "Enter a valid date.");
        }
        parsed
    });
    errors.into_result("Failed to save changes to user")?;

    let (Some(email), Some(password), Some(dob)) = (email, password, dob) else {
        return Err(MockError::Invalid {
            message: "Failed to save changes to user".to_string(),
            errors: Default::default(),
        });
    };
    let user = store
        .users
        .get_mut(&user_id)
        .ok_or_else(|| MockError::NotFound(format!("User {user_id} does not exist")))?;
    user.email = email;
    user.password = password;
    user.dob = dob;
    if let Some(avatar) = form.media_path("avatar") {
        user.avatar = Some(avatar);
    }
    info!(user_id, "user updated");
    Ok(())
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `GET /api/items/?q=`: all items, or those whose title or description
/// contains `q` (case-insensitive).
pub async fn list_items(
    State(db): State<Db>,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Reply {
    let store = db.read().await;
    require_user(&jar, &store)?;
    let needle = params.q.filter(|q| !q.is_empty()).map(|q| q.to_lowercase());
    let now = Utc::now();
    let items = store
        .items
        .values()
        .filter(|item| match &needle {
            Some(n) => item.title.to_lowercase().contains(n) || item.desc.to_lowercase().contains(n),
            None => true,
        })
        .map(|item| store.item_view(item, now))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ok(items))
}

struct ItemFields {
    title: String,
    desc: String,
    starting_price: Price,
    end_date: DateTime<Utc>,
}

fn item_fields(form: &FormInput, message: &str) -> Result<ItemFields, MockError> {
    let mut errors = FieldErrors::default();
    let title = form.required("title", &mut errors);
    let desc = form.text("desc").unwrap_or_default().to_string();
    let starting_price = form.required("starting_price", &mut errors).and_then(|p| {
        let parsed = Price::parse(&p);
        if parsed.is_none() {
            errors.add("starting_price", "Enter a number.");
        }
        parsed
    });
    let end_date = form.required("end_date", &mut errors).and_then(|d| {
        let parsed = parse_end_date(&d);
        if parsed.is_none() {
            errors.add("end_date", "Enter a valid date/time.");
        }
        parsed
    });
    errors.into_result(message)?;
    match (title, starting_price, end_date) {
        (Some(title), Some(starting_price), Some(end_date)) => Ok(ItemFields {
            title,
            desc,
            starting_price,
            end_date,
        }),
        _ => Err(MockError::Invalid {
            message: message.to_string(),
            errors: Default::default(),
        }),
    }
}

pub async fn create_item(State(db): State<Db>, jar: CookieJar, multipart: Multipart) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let owner = require_user(&jar, &store)?;
    let fields = item_fields(&form, "Failed to create the item")?;

    let id = store.next_id();
    let item = ItemRecord {
        id,
        owner,
        title: fields.title,
        desc: fields.desc,
        photo: form.media_path("photo"),
        starting_price: fields.starting_price,
        bid_price: None,
        bid_user: None,
        end_date: fields.end_date,
    };
    store.items.insert(id, item.clone());
    info!(item_id = id, owner, "item created");
    Ok(ok(store.item_view(&item, Utc::now())?))
}

pub async fn get_item(State(db): State<Db>, jar: CookieJar, Path(item_id): Path<u64>) -> Reply {
    let store = db.read().await;
    require_user(&jar, &store)?;
    let item = store.item(item_id)?;
    Ok(ok(store.item_view(item, Utc::now())?))
}

pub async fn update_item(
    State(db): State<Db>,
    jar: CookieJar,
    Path(item_id): Path<u64>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    if store.item(item_id)?.owner != me {
        return Err(MockError::Unauthorized("You can only edit your own items".to_string()));
    }
    let fields = item_fields(&form, "Failed to update the item")?;

    let item = store
        .items
        .get_mut(&item_id)
        .ok_or_else(|| MockError::NotFound(format!("Item {item_id} does not exist")))?;
    item.title = fields.title;
    item.desc = fields.desc;
    item.starting_price = fields.starting_price;
    item.end_date = fields.end_date;
    if let Some(photo) = form.media_path("photo") {
        item.photo = Some(photo);
    }
    let item = item.clone();
    info!(item_id, "item updated");
    Ok(ok(store.item_view(&item, Utc::now())?))
}

/// `PUT /api/items/{id}/bid/`: a bid must beat the previous bid and be at
/// least the starting price. Owners cannot bid, nor can anyone once the
/// auction has ended.
pub async fn bid_item(
    State(db): State<Db>,
    jar: CookieJar,
    Path(item_id): Path<u64>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    let now = Utc::now();
    let item = store.item(item_id)?;
    if item.owner == me {
        return Err(MockError::Unauthorized("You cannot bid on your own items.".to_string()));
    }
    if item.has_ended(now) {
        return Err(MockError::Forbidden("Item auction has ended.".to_string()));
    }

    let mut errors = FieldErrors::default();
    let bid = match form.text("bid_price").map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            errors.add("bid_price", "Bid price must be provided");
            None
        }
        Some(text) => match Price::parse(text) {
            None => {
                errors.add("bid_price", "Enter a number.");
                None
            }
            Some(bid) if item.bid_price.is_some_and(|old| bid <= old) => {
                errors.add(
                    "bid_price",
                    "New bid price must be higher than previous pid price",
                );
                None
            }
            Some(bid) if bid < item.starting_price => {
                errors.add("bid_price", "Bid price cannot be less than starting price");
                None
            }
            Some(bid) => Some(bid),
        },
    };
    errors.into_result("Failed to place bid on the item")?;
    let Some(bid) = bid else {
        return Err(MockError::Invalid {
            message: "Failed to place bid on the item".to_string(),
            errors: Default::default(),
        });
    };

    let item = store
        .items
        .get_mut(&item_id)
        .ok_or_else(|| MockError::NotFound(format!("Item {item_id} does not exist")))?;
    item.bid_price = Some(bid);
    item.bid_user = Some(me);
    let item = item.clone();
    info!(item_id, bidder = me, bid = %bid, "bid placed");
    Ok(ok(store.item_view(&item, now)?))
}

// ---------------------------------------------------------------------------
// Item queries
// ---------------------------------------------------------------------------

pub async fn list_queries(State(db): State<Db>, jar: CookieJar, Path(item_id): Path<u64>) -> Reply {
    let store = db.read().await;
    require_user(&jar, &store)?;
    store.item(item_id)?;
    let queries = store
        .queries
        .values()
        .filter(|q| q.item == item_id)
        .map(|q| store.query_view(q))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ok(queries))
}

pub async fn create_query(
    State(db): State<Db>,
    jar: CookieJar,
    Path(item_id): Path<u64>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    store.item(item_id)?;
    let question = required_text(&form, "question", "Failed to create an item query")?;

    let id = store.next_id();
    let query = QueryRecord {
        id,
        item: item_id,
        question,
        answer: None,
        asked_by: me,
    };
    store.queries.insert(id, query.clone());
    info!(item_id, query_id = id, "query created");
    Ok(ok(store.query_view(&query)?))
}

pub async fn get_query(
    State(db): State<Db>,
    jar: CookieJar,
    Path((item_id, query_id)): Path<(u64, u64)>,
) -> Reply {
    let store = db.read().await;
    require_user(&jar, &store)?;
    store.item(item_id)?;
    let query = store.query(item_id, query_id)?;
    Ok(ok(store.query_view(query)?))
}

pub async fn update_query(
    State(db): State<Db>,
    jar: CookieJar,
    Path((item_id, query_id)): Path<(u64, u64)>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    store.item(item_id)?;
    if store.query(item_id, query_id)?.asked_by != me {
        return Err(MockError::Unauthorized(
            "You can only edit your own queries.".to_string(),
        ));
    }
    let question = required_text(&form, "question", "Failed to update the query")?;
    let query = store
        .queries
        .get_mut(&query_id)
        .ok_or_else(|| MockError::NotFound(format!("Query {query_id} does not exist")))?;
    query.question = question;
    let query = query.clone();
    Ok(ok(store.query_view(&query)?))
}

/// `PUT /api/items/{id}/queries/{qid}/answer/`: owner-only.
pub async fn answer_query(
    State(db): State<Db>,
    jar: CookieJar,
    Path((item_id, query_id)): Path<(u64, u64)>,
    multipart: Multipart,
) -> Reply {
    let form = FormInput::read(multipart).await?;
    let mut store = db.write().await;
    let me = require_user(&jar, &store)?;
    if store.item(item_id)?.owner != me {
        return Err(MockError::Unauthorized(
            "You can only answer queries on your own items.".to_string(),
        ));
    }
    store.query(item_id, query_id)?;
    let answer = required_text(&form, "answer", "Failed to answer the query.")?;
    let query = store
        .queries
        .get_mut(&query_id)
        .ok_or_else(|| MockError::NotFound(format!("Query {query_id} does not exist")))?;
    query.answer = Some(answer);
    let query = query.clone();
    info!(item_id, query_id, "query answered");
    Ok(ok(store.query_view(&query)?))
}

fn required_text(form: &FormInput, field: &str, message: &str) -> Result<String, MockError> {
    let mut errors = FieldErrors::default();
    let value = form.required(field, &mut errors);
    errors.into_result(message)?;
    value.ok_or_else(|| MockError::Invalid {
        message: message.to_string(),
        errors: Default::default(),
    })
}
