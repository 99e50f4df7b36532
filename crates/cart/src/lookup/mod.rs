//! Stock and product lookups.
//!
//! The cart never owns catalog data. Before a mutation is committed it asks
//! two external services:
//!
//! - [`InventoryLookup`] - how many units of a product can be bought
//! - [`CatalogLookup`] - the display record of a product being added
//!
//! Both return `Ok(None)` when the service has no record for the ID, and an
//! error only when the service could not be asked or answered nonsense.
//! [`ApiClient`] implements both against the RocketShoes REST API.

mod api;

pub use api::ApiClient;

use async_trait::async_trait;
use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the stock or product services.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Response could not be decoded or does not describe the requested ID.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// A record the operation depends on does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Port for querying available stock.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    /// Fetch the stock record for a product.
    async fn stock(&self, id: ProductId) -> Result<Option<Stock>, LookupError>;
}

/// Port for querying catalog products.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Fetch the catalog record for a product.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, LookupError>;
}
