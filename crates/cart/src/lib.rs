//! RocketShoes cart library.
//!
//! Client-side shopping-cart state for the storefront UI: an in-memory cart
//! mirrored to durable storage, with every addition and quantity change
//! checked against the stock service first.
//!
//! # Modules
//!
//! - [`store`] - [`CartStore`], the state container and its three operations
//! - [`lookup`] - Stock and product lookup ports and the REST [`ApiClient`]
//! - [`storage`] - Durable key-value storage for the serialized cart
//! - [`notify`] - Shopper-facing notices
//! - [`config`] - Environment-based configuration
//! - [`error`] - [`CartError`] and its notice mapping
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::{CartConfig, CartStore, TracingNotifier};
//! use rocketshoes_core::ProductId;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config, Arc::new(TracingNotifier))?;
//!
//! store.add_product(ProductId::new(1)).await?;
//! store.update_product_amount(ProductId::new(1), 3).await?;
//! println!("{} items", store.cart().total_quantity());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod lookup;
pub mod notify;
pub mod storage;
pub mod store;

pub use config::{ApiConfig, CartConfig, ConfigError, DEFAULT_STORAGE_KEY};
pub use error::{CartError, ErrorKind, OUT_OF_STOCK_MESSAGE, Operation};
pub use lookup::{ApiClient, CatalogLookup, InventoryLookup, LookupError};
pub use notify::{ChannelNotifier, Notice, Notifier, TracingNotifier};
pub use storage::{DurableStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{AddOutcome, CartServices, CartStore};
