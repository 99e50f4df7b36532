//! REST client for the RocketShoes stock and product API.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET stock/{id}` -> `{ "id": 1, "amount": 3 }`
//! - `GET products/{id}` -> `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! A `404` is a failed lookup, as is any other non-2xx status. A successful
//! response with a `null` or empty body means the service has no record.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{CatalogLookup, InventoryLookup, LookupError};
use crate::config::ApiConfig;

/// HTTP client for the stock and product endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.token {
            let auth_value = format!("Bearer {}", token.expose_secret());
            let mut value = HeaderValue::from_str(&auth_value)
                .map_err(|e| LookupError::Malformed(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch and decode a single record. An empty or `null` body is `None`.
    async fn get_record<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, LookupError> {
        let url = self.base_url.join(path)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(path, "record not found");
            return Err(LookupError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| LookupError::Malformed(format!("{path}: {e}")))?;
        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| LookupError::Malformed(format!("{path}: {e}")))
    }
}

#[async_trait]
impl InventoryLookup for ApiClient {
    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Option<Stock>, LookupError> {
        let stock: Option<Stock> = self.get_record(&format!("stock/{id}")).await?;
        match stock {
            Some(stock) if stock.id != id => Err(LookupError::Malformed(format!(
                "stock/{id}: response describes product {}",
                stock.id
            ))),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl CatalogLookup for ApiClient {
    #[instrument(skip(self, id), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Option<Product>, LookupError> {
        let product: Option<Product> = self.get_record(&format!("products/{id}")).await?;
        match product {
            Some(product) if product.id != id => Err(LookupError::Malformed(format!(
                "products/{id}: response describes product {}",
                product.id
            ))),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(base: &str, token: Option<&str>) -> ApiConfig {
        ApiConfig {
            base_url: Url::parse(base).unwrap(),
            token: token.map(SecretString::from),
        }
    }

    #[test]
    fn test_new_without_token() {
        let client = ApiClient::new(&config("http://localhost:3333/", None)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3333/");
    }

    #[test]
    fn test_new_rejects_token_with_newline() {
        let result = ApiClient::new(&config("http://localhost:3333/", Some("bad\ntoken")));
        assert!(matches!(result, Err(LookupError::Malformed(_))));
    }

    #[test]
    fn test_paths_join_under_base() {
        let client = ApiClient::new(&config("http://localhost:3333/api/", None)).unwrap();
        let url = client.base_url().join("stock/7").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/api/stock/7");
    }
}
