//! Typed client core for the auction REST backend.
//!
//! # Overview
//! `AuctionClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern).
//! `AuctionApi` pairs it with a reqwest-backed `HttpTransport` for callers
//! that just want one async call per endpoint. `RouteTable` maps the
//! front end's hash-based URLs to pages.
//!
//! # Design
//! - `AuctionClient` is stateless; it holds only `base_url`.
//! - Every endpoint answers with the same `{status, message, value}`
//!   envelope. A non-`OK` status becomes `ApiError::Failed` carrying the
//!   server's message verbatim.
//! - Writes are multipart form bodies (`FormData`), reads may carry a
//!   URL-encoded query.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod routes;
pub mod transport;
pub mod types;

pub use api::AuctionApi;
pub use client::AuctionClient;
pub use config::{ClientConfig, Environment};
pub use envelope::{ServerResponse, Status};
pub use error::ApiError;
pub use form::{FilePart, FormData, FormFields, FormValue};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use routes::{Page, Route, RouteError, RouteTable};
pub use transport::HttpTransport;
pub use types::{
    parse_price, Item, ItemBidParams, ItemEditParams, ItemQuery, ItemQueryAnswerParams,
    ItemQueryEditParams, User, UserEditParams,
};
