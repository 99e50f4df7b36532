//! Cart operation errors.
//!
//! Every failed [`crate::CartStore`] operation returns a [`CartError`] and
//! also shows exactly one notice to the shopper. The notice text depends
//! only on the error kind and the operation, see [`CartError::notice_message`].

use rocketshoes_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::lookup::LookupError;
use crate::storage::StorageError;

/// Shown when a requested quantity exceeds the available stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

/// A cart operation failure.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is below one.
    #[error("invalid quantity {0}: must be at least 1")]
    InvalidAmount(i64),

    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Requested quantity exceeds what is in stock.
    #[error("requested {requested} of product {product_id} but only {available} available")]
    StockExceeded {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// The change would break a cart invariant.
    #[error("invalid cart change: {0}")]
    Invariant(#[from] CartInvariantError),

    /// Stock or product lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Writing the durable copy failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Coarse classification of a [`CartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: quantity below one, missing cart line or duplicate line.
    Validation,
    /// Requested quantity exceeds stock.
    StockExceeded,
    /// External lookup failed or returned unusable data.
    Lookup,
    /// Durable copy could not be written.
    Persistence,
}

/// The public cart operations, used to pick the failure notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddProduct,
    RemoveProduct,
    UpdateProductAmount,
}

impl Operation {
    /// Generic failure notice for the operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::AddProduct => "Error adding product",
            Self::RemoveProduct => "Error removing product",
            Self::UpdateProductAmount => "Error changing product quantity",
        }
    }
}

impl CartError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAmount(_) | Self::NotInCart(_) | Self::Invariant(_) => {
                ErrorKind::Validation
            }
            Self::StockExceeded { .. } => ErrorKind::StockExceeded,
            Self::Lookup(_) => ErrorKind::Lookup,
            Self::Storage(_) | Self::Serialize(_) => ErrorKind::Persistence,
        }
    }

    /// The notice shown to the shopper when `operation` fails with this error.
    #[must_use]
    pub const fn notice_message(&self, operation: Operation) -> &'static str {
        match self.kind() {
            ErrorKind::StockExceeded => OUT_OF_STOCK_MESSAGE,
            ErrorKind::Validation | ErrorKind::Lookup | ErrorKind::Persistence => {
                operation.failure_message()
            }
        }
    }
}
