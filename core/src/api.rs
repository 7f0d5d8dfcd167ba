//! Async facade: one call per endpoint, build → execute → parse.
//!
//! Calls are independent. Two concurrent bids are not guaranteed to reach
//! the backend in submission order; callers that care must await one before
//! issuing the next.

use url::Url;

use crate::client::AuctionClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::HttpTransport;
use crate::types::{
    Item, ItemBidParams, ItemEditParams, ItemQuery, ItemQueryAnswerParams, ItemQueryEditParams,
    User, UserEditParams,
};

#[derive(Debug, Clone)]
pub struct AuctionApi {
    client: AuctionClient,
    transport: HttpTransport,
}

impl AuctionApi {
    pub fn new(client: AuctionClient, transport: HttpTransport) -> Self {
        Self { client, transport }
    }

    /// # Errors
    /// Returns [`ApiError::InvalidConfig`] if the configured base is not an
    /// absolute URL. A same-origin production config only works for hosts
    /// that resolve relative URLs themselves, so it is rejected here.
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = config.base_url();
        Url::parse(&base).map_err(|e| {
            ApiError::InvalidConfig(format!("production transport needs an origin, got '{base}': {e}"))
        })?;
        Ok(Self::new(AuctionClient::new(&base), HttpTransport::new()?))
    }

    pub fn client(&self) -> &AuctionClient {
        &self.client
    }

    pub async fn list_items(&self, search: Option<&str>) -> Result<Vec<Item>, ApiError> {
        let response = self.transport.execute(self.client.build_list_items(search)).await?;
        self.client.parse_list_items(response)
    }

    pub async fn get_item(&self, id: u64) -> Result<Item, ApiError> {
        let response = self.transport.execute(self.client.build_get_item(id)).await?;
        self.client.parse_get_item(response)
    }

    pub async fn create_item(&self, params: &ItemEditParams) -> Result<Item, ApiError> {
        let response = self.transport.execute(self.client.build_create_item(params)).await?;
        self.client.parse_create_item(response)
    }

    pub async fn update_item(&self, id: u64, params: &ItemEditParams) -> Result<Item, ApiError> {
        let response = self.transport.execute(self.client.build_update_item(id, params)).await?;
        self.client.parse_update_item(response)
    }

    pub async fn bid_item(&self, item_id: u64, bid: &ItemBidParams) -> Result<Item, ApiError> {
        let response = self.transport.execute(self.client.build_bid_item(item_id, bid)).await?;
        self.client.parse_bid_item(response)
    }

    pub async fn list_item_queries(&self, item_id: u64) -> Result<Vec<ItemQuery>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_list_item_queries(item_id))
            .await?;
        self.client.parse_list_item_queries(response)
    }

    pub async fn get_item_query(&self, item_id: u64, query_id: u64) -> Result<ItemQuery, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_get_item_query(item_id, query_id))
            .await?;
        self.client.parse_get_item_query(response)
    }

    pub async fn create_item_query(
        &self,
        item_id: u64,
        query: &ItemQueryEditParams,
    ) -> Result<ItemQuery, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_create_item_query(item_id, query))
            .await?;
        self.client.parse_create_item_query(response)
    }

    pub async fn update_item_query(
        &self,
        item_id: u64,
        query_id: u64,
        query: &ItemQueryEditParams,
    ) -> Result<ItemQuery, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_update_item_query(item_id, query_id, query))
            .await?;
        self.client.parse_update_item_query(response)
    }

    pub async fn answer_item_query(
        &self,
        item_id: u64,
        query_id: u64,
        answer: &ItemQueryAnswerParams,
    ) -> Result<ItemQuery, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_answer_item_query(item_id, query_id, answer))
            .await?;
        self.client.parse_answer_item_query(response)
    }

    pub async fn get_user(&self, user_id: u64) -> Result<User, ApiError> {
        let response = self.transport.execute(self.client.build_get_user(user_id)).await?;
        self.client.parse_get_user(response)
    }

    pub async fn update_user(&self, user_id: u64, user: &UserEditParams) -> Result<Option<User>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_update_user(user_id, user))
            .await?;
        self.client.parse_update_user(response)
    }

    pub async fn get_current_user(&self) -> Result<Option<User>, ApiError> {
        let response = self.transport.execute(self.client.build_get_current_user()).await?;
        self.client.parse_get_current_user(response)
    }

    pub async fn update_current_user(&self, user: &UserEditParams) -> Result<Option<User>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_update_current_user(user))
            .await?;
        self.client.parse_update_current_user(response)
    }
}
