//! The cart: an ordered list of line items, unique by product.
//!
//! A [`Cart`] is immutable. Every change produces a new cart, so a snapshot
//! handed to a reader never changes underneath it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;
use super::product::{CartItem, Product};

/// Reasons a list of line items is not a valid cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// A line item has a quantity below one.
    #[error("product {0} has a quantity below 1")]
    AmountBelowMinimum(ProductId),
    /// The same product appears in more than one line.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
}

/// The contents of one shopping cart.
///
/// Invariants, checked on every construction path including deserialization:
/// - every line has `amount >= 1`
/// - no two lines share a product ID
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from line items, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns an error if a line has a zero quantity or a product appears
    /// twice.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartInvariantError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.amount < 1 {
                return Err(CartInvariantError::AmountBelowMinimum(item.id()));
            }
            if !seen.insert(item.id()) {
                return Err(CartInvariantError::DuplicateProduct(item.id()));
            }
        }
        Ok(Self { items })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Iterate over line items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the product has a line in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Quantity in the cart per product, for badges on product listings.
    #[must_use]
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.id(), item.amount))
            .collect()
    }

    /// A new cart with `product` appended as a line of quantity one.
    ///
    /// # Errors
    ///
    /// Returns [`CartInvariantError::DuplicateProduct`] if the product is
    /// already in the cart.
    pub fn with_product_added(&self, mut product: Product) -> Result<Self, CartInvariantError> {
        if self.contains(product.id) {
            return Err(CartInvariantError::DuplicateProduct(product.id));
        }
        // The line's own quantity is the only `amount` that may be serialized.
        product.extra.remove("amount");
        let mut items = self.items.clone();
        items.push(CartItem::new(product, 1));
        Ok(Self { items })
    }

    /// A new cart where the line for `id` has quantity `amount`.
    ///
    /// Order and every other line are preserved. Returns `None` if the
    /// product is not in the cart or `amount` is zero.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if amount < 1 || !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id() == id {
                    item.with_amount(amount)
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// A new cart without the line for `id`.
    ///
    /// Returns `None` if the product is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<CartItem>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: i32, cents: i64) -> Product {
        Product::new(ProductId::new(id), format!("Shoe {id}"), Price::from_cents(cents), "")
    }

    fn line(id: i32, amount: u32) -> CartItem {
        CartItem::new(product(id, 10_000), amount)
    }

    #[test]
    fn test_from_items_rejects_zero_amount() {
        let result = Cart::from_items(vec![line(1, 1), line(2, 0)]);
        assert_eq!(
            result.unwrap_err(),
            CartInvariantError::AmountBelowMinimum(ProductId::new(2))
        );
    }

    #[test]
    fn test_from_items_rejects_duplicates() {
        let result = Cart::from_items(vec![line(1, 1), line(1, 2)]);
        assert_eq!(
            result.unwrap_err(),
            CartInvariantError::DuplicateProduct(ProductId::new(1))
        );
    }

    #[test]
    fn test_deserialize_checks_invariants() {
        let duplicated = r#"[
            {"id":1,"title":"A","price":10,"image":"","amount":1},
            {"id":1,"title":"A","price":10,"image":"","amount":3}
        ]"#;
        assert!(serde_json::from_str::<Cart>(duplicated).is_err());

        let valid = r#"[{"id":1,"title":"A","price":10,"image":"","amount":3}]"#;
        let cart: Cart = serde_json::from_str(valid).unwrap();
        assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 3);
    }

    #[test]
    fn test_serializes_as_array() {
        let cart = Cart::from_items(vec![line(1, 2)]).unwrap();
        let value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["amount"], 2);
    }

    #[test]
    fn test_with_product_added_appends_once() {
        let cart = Cart::from_items(vec![line(1, 2)]).unwrap();

        let added = cart.with_product_added(product(2, 5_000)).unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added.items()[1].id(), ProductId::new(2));
        assert_eq!(added.items()[1].amount, 1);

        assert_eq!(
            added.with_product_added(product(2, 5_000)).unwrap_err(),
            CartInvariantError::DuplicateProduct(ProductId::new(2))
        );
        // The original snapshot is untouched.
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_with_amount_replaces_only_matching_line() {
        let cart = Cart::from_items(vec![line(1, 1), line(2, 1), line(3, 1)]).unwrap();

        let updated = cart.with_amount(ProductId::new(2), 5).unwrap();
        let ids: Vec<_> = updated.iter().map(CartItem::id).collect();
        assert_eq!(ids, vec![ProductId::new(1), ProductId::new(2), ProductId::new(3)]);
        assert_eq!(updated.get(ProductId::new(2)).unwrap().amount, 5);
        assert_eq!(updated.get(ProductId::new(1)).unwrap().amount, 1);

        assert!(cart.with_amount(ProductId::new(9), 2).is_none());
        assert!(cart.with_amount(ProductId::new(1), 0).is_none());
    }

    #[test]
    fn test_without_removes_line() {
        let cart = Cart::from_items(vec![line(1, 1), line(2, 4)]).unwrap();

        let removed = cart.without(ProductId::new(1)).unwrap();
        assert_eq!(removed.len(), 1);
        assert!(!removed.contains(ProductId::new(1)));
        assert!(removed.without(ProductId::new(1)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items(vec![
            CartItem::new(product(1, 17_990), 2),
            CartItem::new(product(2, 5_000), 1),
        ])
        .unwrap();

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Price::from_cents(40_980));
        assert_eq!(cart.amounts().get(&ProductId::new(1)), Some(&2));
        assert_eq!(Cart::empty().total(), Price::ZERO);
    }
}
