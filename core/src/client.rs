//! Stateless HTTP request builder and response parser for the auction API.
//!
//! # Design
//! `AuctionClient` holds only a `base_url`. Every endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the caller executes the round-trip.
//!
//! Three generic operations sit underneath the endpoint wrappers:
//! `build_get` (optional URL-encoded query), `build_post` / `build_put`
//! (multipart form body), and `parse_value` (envelope unwrapping). The
//! wrappers only pick a verb and interpolate a path.

use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::config::ClientConfig;
use crate::envelope::ServerResponse;
use crate::error::ApiError;
use crate::form::FormFields;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Item, ItemBidParams, ItemEditParams, ItemQuery, ItemQueryAnswerParams, ItemQueryEditParams,
    User, UserEditParams,
};

/// Prefix of every backend endpoint.
const API_PREFIX: &str = "/api";

/// Synchronous, stateless client for the auction API.
#[derive(Debug, Clone)]
pub struct AuctionClient {
    base_url: String,
}

impl AuctionClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `endpoint`, with a trailing slash appended if missing.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let mut url = format!("{}{API_PREFIX}{endpoint}", self.base_url);
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    // -----------------------------------------------------------------------
    // Generic verbs
    // -----------------------------------------------------------------------

    pub fn build_get(&self, endpoint: &str, query: Option<&[(&str, &str)]>) -> HttpRequest {
        let mut url = self.endpoint_url(endpoint);
        if let Some(pairs) = query {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter())
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_post(&self, endpoint: &str, body: &impl FormFields) -> HttpRequest {
        self.build_with_form(HttpMethod::Post, endpoint, body)
    }

    pub fn build_put(&self, endpoint: &str, body: &impl FormFields) -> HttpRequest {
        self.build_with_form(HttpMethod::Put, endpoint, body)
    }

    fn build_with_form(&self, method: HttpMethod, endpoint: &str, body: &impl FormFields) -> HttpRequest {
        HttpRequest {
            method,
            url: self.endpoint_url(endpoint),
            headers: Vec::new(),
            body: Some(body.to_form_data()),
        }
    }

    /// Unwrap the envelope in `response` and decode its `value` as `T`.
    ///
    /// The HTTP status code is not consulted; the envelope's `status` field
    /// is authoritative.
    pub fn parse_value<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        ServerResponse::from_body(&response.body)?.into_value()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// List all items, or only those matching `search` when given.
    pub fn build_list_items(&self, search: Option<&str>) -> HttpRequest {
        match search {
            Some(q) if !q.is_empty() => self.build_get("/items", Some(&[("q", q)])),
            _ => self.build_get("/items", None),
        }
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        self.parse_value(response)
    }

    pub fn build_get_item(&self, id: u64) -> HttpRequest {
        self.build_get(&format!("/items/{id}"), None)
    }

    pub fn parse_get_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        self.parse_value(response)
    }

    pub fn build_create_item(&self, params: &ItemEditParams) -> HttpRequest {
        self.build_post("/items", params)
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        self.parse_value(response)
    }

    pub fn build_update_item(&self, id: u64, params: &ItemEditParams) -> HttpRequest {
        self.build_put(&format!("/items/{id}"), params)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        self.parse_value(response)
    }

    pub fn build_bid_item(&self, item_id: u64, bid: &ItemBidParams) -> HttpRequest {
        self.build_put(&format!("/items/{item_id}/bid"), bid)
    }

    pub fn parse_bid_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        self.parse_value(response)
    }

    // -----------------------------------------------------------------------
    // Item queries
    // -----------------------------------------------------------------------

    pub fn build_list_item_queries(&self, item_id: u64) -> HttpRequest {
        self.build_get(&format!("/items/{item_id}/queries"), None)
    }

    pub fn parse_list_item_queries(&self, response: HttpResponse) -> Result<Vec<ItemQuery>, ApiError> {
        self.parse_value(response)
    }

    pub fn build_get_item_query(&self, item_id: u64, query_id: u64) -> HttpRequest {
        self.build_get(&format!("/items/{item_id}/queries/{query_id}"), None)
    }

    pub fn parse_get_item_query(&self, response: HttpResponse) -> Result<ItemQuery, ApiError> {
        self.parse_value(response)
    }

    pub fn build_create_item_query(&self, item_id: u64, query: &ItemQueryEditParams) -> HttpRequest {
        self.build_post(&format!("/items/{item_id}/queries"), query)
    }

    pub fn parse_create_item_query(&self, response: HttpResponse) -> Result<ItemQuery, ApiError> {
        self.parse_value(response)
    }

    pub fn build_update_item_query(
        &self,
        item_id: u64,
        query_id: u64,
        query: &ItemQueryEditParams,
    ) -> HttpRequest {
        self.build_put(&format!("/items/{item_id}/queries/{query_id}"), query)
    }

    pub fn parse_update_item_query(&self, response: HttpResponse) -> Result<ItemQuery, ApiError> {
        self.parse_value(response)
    }

    pub fn build_answer_item_query(
        &self,
        item_id: u64,
        query_id: u64,
        answer: &ItemQueryAnswerParams,
    ) -> HttpRequest {
        self.build_put(&format!("/items/{item_id}/queries/{query_id}/answer"), answer)
    }

    pub fn parse_answer_item_query(&self, response: HttpResponse) -> Result<ItemQuery, ApiError> {
        self.parse_value(response)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn build_get_user(&self, user_id: u64) -> HttpRequest {
        self.build_get(&format!("/users/{user_id}"), None)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        self.parse_value(response)
    }

    pub fn build_update_user(&self, user_id: u64, user: &UserEditParams) -> HttpRequest {
        self.build_put(&format!("/users/{user_id}"), user)
    }

    /// Some backends acknowledge a profile update without echoing the user.
    pub fn parse_update_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        self.parse_value(response)
    }

    pub fn build_get_current_user(&self) -> HttpRequest {
        self.build_get("/profile", None)
    }

    /// `None` when nobody is logged in.
    pub fn parse_get_current_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        self.parse_value(response)
    }

    pub fn build_update_current_user(&self, user: &UserEditParams) -> HttpRequest {
        self.build_put("/profile", user)
    }

    pub fn parse_update_current_user(&self, response: HttpResponse) -> Result<Option<User>, ApiError> {
        self.parse_value(response)
    }
}
