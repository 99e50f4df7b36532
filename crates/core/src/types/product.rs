//! Catalog records and cart line items.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product as returned by the product API.
///
/// Only `id` matters to the cart; the display attributes are carried along
/// for the UI. Attributes the cart does not know about are kept verbatim in
/// `extra` so they survive a round-trip through durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Create a product with no extra attributes.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Price, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Available quantity of a product, as reported by the stock API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    /// Maximum purchasable quantity. Zero or less means out of stock.
    pub amount: i64,
}

impl Stock {
    /// Create a stock record.
    #[must_use]
    pub const fn new(id: ProductId, amount: i64) -> Self {
        Self { id, amount }
    }

    /// Whether nothing can be purchased.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.amount <= 0
    }

    /// Whether `requested` units fit within the available quantity.
    #[must_use]
    pub fn allows(&self, requested: u32) -> bool {
        i64::from(requested) <= self.amount
    }
}

/// A product held in the cart together with its quantity.
///
/// Serialized flat, i.e. the product fields followed by `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    pub amount: u32,
}

impl CartItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// The product ID of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// A copy of this line with a different quantity.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            product: self.product.clone(),
            amount,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price * self.amount
    }
}
