//! Domain DTOs for the auction API.
//!
//! # Design
//! These mirror the backend's JSON but are defined independently from the
//! mock-server crate; integration tests catch schema drift between the two.
//!
//! Prices travel as decimal text (`"12.50"`) and are kept as `String` so they
//! reach the backend byte-for-byte as received. Use `parse_price` when a
//! number is needed. Timestamps and dates are also opaque text.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::form::{FilePart, FormData, FormFields};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub dob: String,
    pub avatar_path: Option<String>,
}

/// An item up for auction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub owner: User,
    pub title: String,
    pub desc: String,
    pub photo_path: Option<String>,
    pub starting_price: String,
    /// Highest bid so far; `None` until someone bids.
    pub bid_price: Option<String>,
    pub bid_user: Option<User>,
    pub end_date: String,
    /// The price to display publicly.
    pub current_price: String,
    pub has_bids: bool,
    pub has_ended: bool,
}

impl Item {
    pub fn current_price_value(&self) -> Result<f64, ApiError> {
        parse_price(&self.current_price)
    }
}

/// A question asked about an item, with the owner's answer once given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemQuery {
    pub id: u64,
    pub question: String,
    pub asked_by: User,
    pub answer: Option<String>,
}

/// Parse a price transmitted as text.
pub fn parse_price(text: &str) -> Result<f64, ApiError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ApiError::InvalidPrice(text.to_string())),
    }
}

/// Fields an owner may set when creating or editing an item. Bid fields are
/// managed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEditParams {
    pub title: String,
    pub desc: String,
    pub photo: Option<FilePart>,
    pub starting_price: f64,
    pub end_date: String,
}

impl FormFields for ItemEditParams {
    fn to_form_data(&self) -> FormData {
        let mut form = FormData::new();
        form.append("title", &self.title)
            .append("desc", &self.desc)
            .append_opt("photo", self.photo.as_ref())
            .append("starting_price", self.starting_price)
            .append("end_date", &self.end_date);
        form
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBidParams {
    pub bid_price: f64,
}

impl FormFields for ItemBidParams {
    fn to_form_data(&self) -> FormData {
        let mut form = FormData::new();
        form.append("bid_price", self.bid_price);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQueryEditParams {
    pub question: String,
}

impl FormFields for ItemQueryEditParams {
    fn to_form_data(&self) -> FormData {
        let mut form = FormData::new();
        form.append("question", &self.question);
        form
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQueryAnswerParams {
    pub answer: String,
}

impl FormFields for ItemQueryAnswerParams {
    fn to_form_data(&self) -> FormData {
        let mut form = FormData::new();
        form.append("answer", &self.answer);
        form
    }
}

/// Profile fields. The backend re-hashes `password` on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserEditParams {
    pub email: String,
    pub password: String,
    pub dob: String,
    pub avatar: Option<FilePart>,
}

impl FormFields for UserEditParams {
    fn to_form_data(&self) -> FormData {
        let mut form = FormData::new();
        form.append("email", &self.email)
            .append("password", &self.password)
            .append("dob", &self.dob)
            .append_opt("avatar", self.avatar.as_ref());
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormValue;

    const ITEM_JSON: &str = r#"{
        "id": 7,
        "owner": {"id": 1, "email": "alice@example.com", "dob": "1990-01-01", "avatar_path": null},
        "title": "Lamp",
        "desc": "Brass",
        "photo_path": "/media/lamp.png",
        "starting_price": "10.00",
        "bid_price": null,
        "bid_user": null,
        "end_date": "2030-01-01T00:00:00Z",
        "current_price": "10.00",
        "has_bids": false,
        "has_ended": false
    }"#;

    #[test]
    fn item_deserializes_with_nullable_bid_fields() {
        let item: Item = serde_json::from_str(ITEM_JSON).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.owner.email, "alice@example.com");
        assert!(item.bid_user.is_none());
        assert!(item.bid_price.is_none());
        assert_eq!(item.current_price_value().unwrap(), 10.0);
    }

    #[test]
    fn item_rejects_missing_fields() {
        let result: Result<Item, _> = serde_json::from_str(r#"{"id": 1, "title": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn parse_price_accepts_decimal_text() {
        assert_eq!(parse_price("12.50").unwrap(), 12.5);
        assert_eq!(parse_price(" 3 ").unwrap(), 3.0);
    }

    #[test]
    fn parse_price_rejects_garbage() {
        assert!(matches!(parse_price("twelve"), Err(ApiError::InvalidPrice(_))));
        assert!(matches!(parse_price("NaN"), Err(ApiError::InvalidPrice(_))));
    }

    #[test]
    fn item_params_omit_missing_photo_and_stringify_price() {
        let params = ItemEditParams {
            title: "Lamp".to_string(),
            desc: "Brass".to_string(),
            photo: None,
            starting_price: 10.0,
            end_date: "2030-01-01T00:00".to_string(),
        };
        let form = params.to_form_data();
        assert!(!form.contains("photo"));
        assert_eq!(form.get("starting_price").and_then(FormValue::as_text), Some("10"));
        let names: Vec<&str> = form.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["title", "desc", "starting_price", "end_date"]);
    }

    #[test]
    fn user_params_include_avatar_file_when_present() {
        let params = UserEditParams {
            email: "a@b.c".to_string(),
            password: "pw".to_string(),
            dob: "1990-01-01".to_string(),
            avatar: Some(FilePart::new("me.jpg", "image/jpeg", vec![0xff])),
        };
        let form = params.to_form_data();
        assert!(matches!(form.get("avatar"), Some(FormValue::File(f)) if f.file_name == "me.jpg"));
    }

    #[test]
    fn bid_params_stringify_fractional_price() {
        let form = ItemBidParams { bid_price: 15.25 }.to_form_data();
        assert_eq!(form.get("bid_price").and_then(FormValue::as_text), Some("15.25"));
    }
}
