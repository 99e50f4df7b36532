//! The cart state container.
//!
//! [`CartStore`] owns the shopper's cart for the session. It is created by an
//! explicit [`CartStore::load`] step that restores the durable copy, and is
//! then handed (cloned) to whatever UI or service code needs it.
//!
//! # Mutations
//!
//! `add_product`, `remove_product` and `update_product_amount` are the only
//! way to change the cart. Each one validates against the stock service,
//! builds a new [`Cart`] and commits it. A commit writes the durable copy
//! first and only then publishes the new snapshot, so a failed write leaves
//! both copies as they were.
//!
//! Mutations run one at a time: each holds an async mutex for its whole
//! duration, including lookups. Reads never wait; [`CartStore::cart`] returns
//! the latest committed snapshot.
//!
//! # Failures
//!
//! A failed mutation returns a [`CartError`] and shows exactly one notice
//! through the configured [`Notifier`]. Successful mutations show nothing.

use std::sync::Arc;

use arc_swap::ArcSwap;
use rocketshoes_core::{Cart, ProductId, Stock};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::config::CartConfig;
use crate::error::{CartError, ErrorKind, Operation};
use crate::lookup::{ApiClient, CatalogLookup, InventoryLookup, LookupError};
use crate::notify::{Notice, Notifier};
use crate::storage::{DurableStorage, FileStorage};

/// External collaborators of a [`CartStore`].
#[derive(Clone)]
pub struct CartServices {
    pub inventory: Arc<dyn InventoryLookup>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub storage: Arc<dyn DurableStorage>,
    pub notifier: Arc<dyn Notifier>,
}

/// What a successful [`CartStore::add_product`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line with quantity one was appended.
    Added,
    /// The existing line's quantity went up by one.
    Incremented,
    /// The stock or product service answered without a record; nothing
    /// changed and no notice was shown.
    Unavailable,
}

/// Handle to the session's cart.
///
/// Cheap to clone; all clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    cart: ArcSwap<Cart>,
    mutations: Mutex<()>,
    services: CartServices,
    storage_key: String,
}

impl CartStore {
    /// Create the store, restoring the cart saved under `storage_key`.
    ///
    /// A missing, unreadable, unparsable or invalid durable copy yields an
    /// empty cart.
    pub fn load(services: CartServices, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let cart = restore(services.storage.as_ref(), &storage_key);
        tracing::info!(items = cart.len(), key = %storage_key, "cart loaded");

        Self {
            inner: Arc::new(CartStoreInner {
                cart: ArcSwap::from_pointee(cart),
                mutations: Mutex::new(()),
                services,
                storage_key,
            }),
        }
    }

    /// Create a store backed by the REST API and file storage from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built.
    pub fn from_config(config: &CartConfig, notifier: Arc<dyn Notifier>) -> Result<Self, LookupError> {
        let api = Arc::new(ApiClient::new(&config.api)?);
        let services = CartServices {
            inventory: api.clone(),
            catalog: api,
            storage: Arc::new(FileStorage::new(&config.storage_dir)),
            notifier,
        };
        Ok(Self::load(services, config.storage_key.clone()))
    }

    /// The latest committed cart.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.inner.cart.load_full()
    }

    /// Add one unit of a product.
    ///
    /// Appends a new line if the product is not in the cart yet, otherwise
    /// raises the existing line by one as long as stock allows.
    ///
    /// # Errors
    ///
    /// - [`CartError::StockExceeded`] if the product is out of stock or the
    ///   line is already at the stock limit
    /// - [`CartError::Lookup`] if a lookup fails
    /// - [`CartError::Storage`] if the cart could not be saved
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> Result<AddOutcome, CartError> {
        let _guard = self.inner.mutations.lock().await;
        let result = self.try_add(id).await;
        self.report(Operation::AddProduct, result)
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// - [`CartError::NotInCart`] if the product has no line
    /// - [`CartError::Storage`] if the cart could not be saved
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn remove_product(&self, id: ProductId) -> Result<(), CartError> {
        let _guard = self.inner.mutations.lock().await;
        let result = self.try_remove(id);
        self.report(Operation::RemoveProduct, result)
    }

    /// Set the quantity of a product's line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidAmount`] if `amount` is below one
    /// - [`CartError::NotInCart`] if the product has no line
    /// - [`CartError::Lookup`] if the stock lookup fails or has no record
    /// - [`CartError::StockExceeded`] if `amount` exceeds the stock
    /// - [`CartError::Storage`] if the cart could not be saved
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) -> Result<(), CartError> {
        let _guard = self.inner.mutations.lock().await;
        let result = self.try_update(id, amount).await;
        self.report(Operation::UpdateProductAmount, result)
    }

    async fn try_add(&self, id: ProductId) -> Result<AddOutcome, CartError> {
        let services = &self.inner.services;

        let Some(stock) = services.inventory.stock(id).await? else {
            tracing::debug!("no stock record, nothing added");
            return Ok(AddOutcome::Unavailable);
        };
        if stock.is_exhausted() {
            return Err(CartError::StockExceeded {
                product_id: id,
                requested: 1,
                available: stock.amount,
            });
        }

        let cart = self.cart();
        if let Some(item) = cart.get(id) {
            let amount = item.amount.saturating_add(1);
            ensure_in_stock(id, amount, stock)?;
            let next = cart.with_amount(id, amount).ok_or(CartError::NotInCart(id))?;
            self.commit(next)?;
            return Ok(AddOutcome::Incremented);
        }

        let Some(product) = services.catalog.product(id).await? else {
            tracing::debug!("no catalog record, nothing added");
            return Ok(AddOutcome::Unavailable);
        };
        if product.id != id {
            return Err(LookupError::Malformed(format!(
                "catalog returned product {} for {id}",
                product.id
            ))
            .into());
        }

        let next = cart.with_product_added(product)?;
        self.commit(next)?;
        Ok(AddOutcome::Added)
    }

    fn try_remove(&self, id: ProductId) -> Result<(), CartError> {
        let next = self.cart().without(id).ok_or(CartError::NotInCart(id))?;
        self.commit(next)
    }

    async fn try_update(&self, id: ProductId, amount: i64) -> Result<(), CartError> {
        if amount < 1 {
            return Err(CartError::InvalidAmount(amount));
        }
        let requested = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;

        let cart = self.cart();
        if !cart.contains(id) {
            return Err(CartError::NotInCart(id));
        }

        let stock = self
            .inner
            .services
            .inventory
            .stock(id)
            .await?
            .ok_or_else(|| LookupError::NotFound(format!("stock for product {id}")))?;
        ensure_in_stock(id, requested, stock)?;

        let next = cart.with_amount(id, requested).ok_or(CartError::NotInCart(id))?;
        self.commit(next)
    }

    /// Save `next` to durable storage, then publish it.
    fn commit(&self, next: Cart) -> Result<(), CartError> {
        let json = serde_json::to_string(&next)?;
        self.inner
            .services
            .storage
            .set_item(&self.inner.storage_key, &json)?;

        tracing::debug!(
            items = next.len(),
            quantity = next.total_quantity(),
            "cart committed"
        );
        self.inner.cart.store(Arc::new(next));
        Ok(())
    }

    /// Show the failure notice for `operation`, if the result is an error.
    fn report<T>(&self, operation: Operation, result: Result<T, CartError>) -> Result<T, CartError> {
        if let Err(e) = &result {
            match e.kind() {
                ErrorKind::Lookup | ErrorKind::Persistence => {
                    tracing::error!(error = %e, ?operation, "cart operation failed");
                }
                ErrorKind::Validation | ErrorKind::StockExceeded => {
                    tracing::info!(error = %e, ?operation, "cart operation rejected");
                }
            }
            self.inner
                .services
                .notifier
                .notify(Notice::error(e.notice_message(operation)));
        }
        result
    }
}

fn ensure_in_stock(id: ProductId, requested: u32, stock: Stock) -> Result<(), CartError> {
    if stock.allows(requested) {
        Ok(())
    } else {
        Err(CartError::StockExceeded {
            product_id: id,
            requested: i64::from(requested),
            available: stock.amount,
        })
    }
}

/// Read the durable copy, falling back to an empty cart.
fn restore(storage: &dyn DurableStorage, key: &str) -> Cart {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return Cart::empty(),
        Err(e) => {
            tracing::warn!(error = %e, "could not read saved cart, starting empty");
            return Cart::empty();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "saved cart is invalid, starting empty");
        Cart::empty()
    })
}
