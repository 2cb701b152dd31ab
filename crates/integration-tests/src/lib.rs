//! Integration tests for Pocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - End-to-end add/increment/decrement flows
//! - `cart_persistence` - File-backed carts surviving restarts, legacy blobs
//!
//! This library holds fixtures shared by the test files.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::Path;

use pocket_cart::{CartConfig, CartStore, FileStore};
use pocket_cart_core::{NewLineItem, Price, ProductId};

/// Storage key used by every test.
pub const TEST_KEY: &str = "@GoMarkeplace:products";

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product_id(id: &str) -> ProductId {
    ProductId::parse(id).expect("valid product id")
}

/// A product descriptor with the given id and price in cents.
///
/// # Panics
///
/// Panics if `id` is blank or `cents` is negative.
#[must_use]
#[allow(clippy::expect_used)]
pub fn product(id: &str, title: &str, cents: i64) -> NewLineItem {
    NewLineItem::new(
        product_id(id),
        title,
        format!("https://img.example/{id}.png"),
        Price::from_cents(cents).expect("non-negative price"),
    )
}

/// Open a file-backed cart store rooted at `dir`.
///
/// # Panics
///
/// Panics if the directory cannot be created.
#[allow(clippy::expect_used)]
pub async fn open_file_cart(dir: &Path, config: CartConfig) -> CartStore {
    let storage = FileStore::open(dir).await.expect("open file store");
    CartStore::open(storage, config.with_storage_key(TEST_KEY)).await
}

/// `(id, quantity)` pairs in cart order.
#[must_use]
pub fn quantities(cart: &pocket_cart::Cart) -> Vec<(String, u32)> {
    cart.items()
        .iter()
        .map(|item| (item.id.to_string(), item.quantity.get()))
        .collect()
}
