//! Cart commands.
//!
//! # Environment Variables
//!
//! - `CART_API_URL` - Stock/product API base URL
//! - `CART_API_TOKEN` - Optional API bearer token
//! - `CART_STORAGE_DIR` - Where the cart file lives
//! - `CART_STORAGE_KEY` - Key the cart is stored under

use std::fmt::Write as _;
use std::sync::Arc;

use rocketshoes_cart::{AddOutcome, CartConfig, CartError, CartStore, ConfigError, LookupError, TracingNotifier};
use rocketshoes_core::{Cart, CurrencyCode, ProductId};
use thiserror::Error;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The API client could not be created.
    #[error("API client error: {0}")]
    Client(#[from] LookupError),

    /// The cart operation failed.
    #[error("Cart operation failed: {0}")]
    Cart(#[from] CartError),
}

/// Load configuration and restore the saved cart.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the API client cannot be
/// built.
pub fn open() -> Result<CartStore, CommandError> {
    let config = CartConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(CartStore::from_config(&config, Arc::new(TracingNotifier))?)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the cart rejects the addition.
pub async fn add(store: &CartStore, id: ProductId) -> Result<(), CommandError> {
    match store.add_product(id).await? {
        AddOutcome::Added => tracing::info!(product_id = %id, "product added"),
        AddOutcome::Incremented => tracing::info!(product_id = %id, "quantity increased"),
        AddOutcome::Unavailable => tracing::warn!(product_id = %id, "product is not sold"),
    }
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns an error if the product is not in the cart or the cart cannot be
/// saved.
pub async fn remove(store: &CartStore, id: ProductId) -> Result<(), CommandError> {
    store.remove_product(id).await?;
    tracing::info!(product_id = %id, "product removed");
    Ok(())
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns an error if the quantity is invalid or exceeds stock.
pub async fn update(store: &CartStore, id: ProductId, amount: i64) -> Result<(), CommandError> {
    store.update_product_amount(id, amount).await?;
    tracing::info!(product_id = %id, amount, "quantity updated");
    Ok(())
}

/// Print the cart to stdout.
#[allow(clippy::print_stdout)]
pub fn show(store: &CartStore) {
    print!("{}", render(&store.cart(), CurrencyCode::default()));
}

/// Format the cart as a plain-text table.
fn render(cart: &Cart, currency: CurrencyCode) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<32}  {:>6}  {:>12}  {:>12}",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    );
    for item in cart {
        let _ = writeln!(
            out,
            "{:>5}  {:<32}  {:>6}  {:>12}  {:>12}",
            item.id(),
            truncate(&item.product.title, 32),
            item.amount,
            item.product.price.display(currency),
            item.subtotal().display(currency),
        );
    }
    let _ = writeln!(
        out,
        "{} products, {} items, total {}",
        cart.len(),
        cart.total_quantity(),
        cart.total().display(currency)
    );
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{CartItem, Price, Product};

    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::empty(), CurrencyCode::BRL), "Cart is empty\n");
    }

    #[test]
    fn test_render_lines_and_total() {
        let cart = Cart::from_items(vec![
            CartItem::new(
                Product::new(ProductId::new(1), "Tênis de Caminhada", Price::from_cents(17_990), ""),
                2,
            ),
            CartItem::new(
                Product::new(ProductId::new(2), "Tênis VR Caminhada", Price::from_cents(13_990), ""),
                1,
            ),
        ])
        .unwrap();

        let out = render(&cart, CurrencyCode::BRL);
        assert!(out.contains("Tênis de Caminhada"));
        assert!(out.contains("R$ 359,80"));
        assert!(out.ends_with("2 products, 3 items, total R$ 499,70\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
