//! In-memory records and their JSON views.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MockError;

/// Password every seeded user logs in with.
pub const SEED_PASSWORD: &str = "password";

/// Money with two decimal places, stored as hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Parse decimal text with at most two fractional digits.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };
        whole.checked_mul(100)?.checked_add(frac).map(Price)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Accepts RFC 3339 as well as the `datetime-local` shapes browsers submit.
/// Naive timestamps are taken as UTC.
pub fn parse_end_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn parse_dob(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

// ---------------------------------------------------------------------------
// Wire views
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub dob: String,
    pub avatar_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub owner: User,
    pub title: String,
    pub desc: String,
    pub photo_path: Option<String>,
    pub starting_price: String,
    pub bid_price: Option<String>,
    pub bid_user: Option<User>,
    pub end_date: String,
    pub current_price: String,
    pub has_bids: bool,
    pub has_ended: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    pub id: u64,
    pub question: String,
    pub asked_by: User,
    pub answer: Option<String>,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct UserRecord {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub dob: NaiveDate,
    pub avatar: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ItemRecord {
    pub id: u64,
    pub owner: u64,
    pub title: String,
    pub desc: String,
    pub photo: Option<String>,
    pub starting_price: Price,
    pub bid_price: Option<Price>,
    pub bid_user: Option<u64>,
    pub end_date: DateTime<Utc>,
}

impl ItemRecord {
    /// The larger of the starting price and the highest bid.
    pub fn current_price(&self) -> Price {
        match self.bid_price {
            Some(bid) if bid > self.starting_price => bid,
            _ => self.starting_price,
        }
    }

    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date < now
    }
}

#[derive(Clone, Debug)]
pub struct QueryRecord {
    pub id: u64,
    pub item: u64,
    pub question: String,
    pub answer: Option<String>,
    pub asked_by: u64,
}

#[derive(Debug, Default)]
pub struct Store {
    pub users: BTreeMap<u64, UserRecord>,
    pub items: BTreeMap<u64, ItemRecord>,
    pub queries: BTreeMap<u64, QueryRecord>,
    next_id: u64,
}

impl Store {
    /// Store with `alice@example.com` (id 1) and `bob@example.com` (id 2).
    pub fn seeded() -> Self {
        let mut store = Store::default();
        for (email, dob) in [("alice@example.com", (1990, 1, 1)), ("bob@example.com", (1985, 6, 15))] {
            let id = store.next_id();
            let dob = NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2).unwrap_or_default();
            store.users.insert(
                id,
                UserRecord {
                    id,
                    email: email.to_string(),
                    password: SEED_PASSWORD.to_string(),
                    dob,
                    avatar: None,
                },
            );
        }
        store
    }

    /// Ids are unique across record kinds, which keeps them unambiguous in
    /// logs.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn item(&self, id: u64) -> Result<&ItemRecord, MockError> {
        self.items
            .get(&id)
            .ok_or_else(|| MockError::NotFound(format!("Item {id} does not exist")))
    }

    /// The query `query_id`, provided it belongs to `item_id`.
    pub fn query(&self, item_id: u64, query_id: u64) -> Result<&QueryRecord, MockError> {
        self.queries
            .get(&query_id)
            .filter(|q| q.item == item_id)
            .ok_or_else(|| MockError::NotFound(format!("Query {query_id} does not exist")))
    }

    pub fn user_view(&self, id: u64) -> Result<User, MockError> {
        let user = self
            .users
            .get(&id)
            .ok_or_else(|| MockError::NotFound(format!("User {id} does not exist")))?;
        Ok(User {
            id: user.id,
            email: user.email.clone(),
            dob: user.dob.format("%Y-%m-%d").to_string(),
            avatar_path: user.avatar.clone(),
        })
    }

    pub fn item_view(&self, item: &ItemRecord, now: DateTime<Utc>) -> Result<Item, MockError> {
        Ok(Item {
            id: item.id,
            owner: self.user_view(item.owner)?,
            title: item.title.clone(),
            desc: item.desc.clone(),
            photo_path: item.photo.clone(),
            starting_price: item.starting_price.to_string(),
            bid_price: item.bid_price.map(|p| p.to_string()),
            bid_user: item.bid_user.map(|id| self.user_view(id)).transpose()?,
            end_date: item.end_date.to_rfc3339_opts(SecondsFormat::Secs, true),
            current_price: item.current_price().to_string(),
            has_bids: item.bid_price.is_some(),
            has_ended: item.has_ended(now),
        })
    }

    pub fn query_view(&self, query: &QueryRecord) -> Result<ItemQuery, MockError> {
        Ok(ItemQuery {
            id: query.id,
            question: query.question.clone(),
            asked_by: self.user_view(query.asked_by)?,
            answer: query.answer.clone(),
        })
    }
}
