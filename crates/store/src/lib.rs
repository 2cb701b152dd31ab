//! Pocket Cart - a persistent shopping cart store.
//!
//! The cart is a list of product line-items with quantities. It lives in
//! memory, is hydrated once from durable key-value storage when the store is
//! opened, and is written back in full after every change.
//!
//! # Architecture
//!
//! - [`cart`] - The [`Cart`] value and the pure reducer applying [`CartAction`]s
//! - [`store`] - [`CartStore`], a handle to a worker task that owns the cart and
//!   applies mutations one at a time
//! - [`storage`] - The [`KeyValueStore`] trait with memory and file backends
//! - [`config`] - [`CartConfig`] loaded from environment variables
//!
//! # Example
//!
//! ```rust,no_run
//! use pocket_cart::{CartConfig, CartStore, MemoryStore};
//! use pocket_cart_core::{NewLineItem, Price, ProductId};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CartStore::open(MemoryStore::new(), CartConfig::default()).await;
//!
//! let id = ProductId::parse("a")?;
//! let price: Price = "10".parse()?;
//! let shirt = NewLineItem::new(id.clone(), "Shirt", "https://img/shirt.png", price);
//! store.add_to_cart(shirt).await?;
//! store.increment(&id).await?;
//!
//! assert_eq!(store.cart().item_count(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;

pub use cart::{Cart, CartAction, DecrementPolicy};
pub use config::{CartConfig, ConfigError};
pub use error::CartError;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, CartSubscription};
