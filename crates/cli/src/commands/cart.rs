//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart list
//!
//! # Add a product (or one more unit of it)
//! cart add --id a --title Shirt --image-url https://img/shirt.png --price 10
//!
//! # Change quantities
//! cart increment a
//! cart decrement a
//!
//! # Drop a product, or everything
//! cart remove a
//! cart clear
//! ```
//!
//! # Environment Variables
//!
//! See [`pocket_cart::config`]. `--data-dir`, `--key`, and `--policy` override
//! `CART_DATA_DIR`, `CART_STORAGE_KEY`, and `CART_DECREMENT_POLICY`.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use pocket_cart::{
    Cart, CartConfig, CartError, CartStore, ConfigError, DecrementPolicy, FileStore, StorageError,
};
use pocket_cart_core::{NewLineItem, Price, PriceError, ProductId, ProductIdError};

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The data directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Invalid product id argument.
    #[error("Invalid product id: {0}")]
    InvalidId(#[from] ProductIdError),

    /// Invalid price argument.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// The cart could not be rendered.
    #[error("Failed to render cart: {0}")]
    Render(#[from] serde_json::Error),
}

/// Settings shared by every cart command.
#[derive(Debug, Default)]
pub struct StoreOptions {
    /// Override for the data directory.
    pub data_dir: Option<PathBuf>,
    /// Override for the storage key.
    pub key: Option<String>,
    /// Override for the decrement policy.
    pub policy: Option<DecrementPolicy>,
}

impl StoreOptions {
    /// Resolve the final configuration from the environment plus overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds an invalid value.
    pub fn config(&self) -> Result<CartConfig, CommandError> {
        Ok(self.overlay(CartConfig::from_env()?))
    }

    /// Apply the command-line overrides on top of `config`.
    #[must_use]
    pub fn overlay(&self, mut config: CartConfig) -> CartConfig {
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir.clone());
        }
        if let Some(key) = &self.key {
            config = config.with_storage_key(key.clone());
        }
        if let Some(policy) = self.policy {
            config = config.with_decrement_policy(policy);
        }
        config
    }
}

/// Arguments for `cart add`.
#[derive(Debug)]
pub struct AddArgs {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: String,
}

async fn open(options: &StoreOptions) -> Result<CartStore, CommandError> {
    let config = options.config()?;
    let storage = FileStore::open(&config.data_dir).await?;
    info!(
        dir = %config.data_dir.display(),
        key = %config.storage_key,
        policy = %config.decrement_policy,
        "Opening cart"
    );
    Ok(CartStore::open(storage, config).await)
}

/// Print the current cart.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub async fn list(options: &StoreOptions) -> Result<(), CommandError> {
    let store = open(options).await?;
    let cart = store.cart();
    store.shutdown().await;
    render(&cart)
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the cart cannot be saved.
pub async fn add(options: &StoreOptions, args: AddArgs) -> Result<(), CommandError> {
    let item = NewLineItem::new(
        ProductId::parse(&args.id)?,
        args.title,
        args.image_url,
        args.price.parse::<Price>()?,
    );
    let store = open(options).await?;
    let result = store.add_to_cart(item).await;
    finish(store, result).await
}

/// Add one unit of a product already in the cart.
///
/// # Errors
///
/// Returns an error if the id is invalid or the cart cannot be saved.
pub async fn increment(options: &StoreOptions, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let store = open(options).await?;
    let result = store.increment(&id).await;
    finish(store, result).await
}

/// Take one unit of a product away.
///
/// # Errors
///
/// Returns an error if the id is invalid or the cart cannot be saved.
pub async fn decrement(options: &StoreOptions, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let store = open(options).await?;
    let result = store.decrement(&id).await;
    finish(store, result).await
}

/// Drop a product from the cart.
///
/// # Errors
///
/// Returns an error if the id is invalid or the cart cannot be saved.
pub async fn remove(options: &StoreOptions, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let store = open(options).await?;
    let result = store.remove(&id).await;
    finish(store, result).await
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub async fn clear(options: &StoreOptions) -> Result<(), CommandError> {
    let store = open(options).await?;
    let result = store.clear().await;
    finish(store, result).await
}

async fn finish(
    store: CartStore,
    result: Result<Cart, CartError>,
) -> Result<(), CommandError> {
    store.shutdown().await;
    render(&result?)
}

fn render(cart: &Cart) -> Result<(), CommandError> {
    let json = serde_json::to_string_pretty(cart)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
        println!(
            "{} item(s), {} line(s), subtotal {}",
            cart.item_count(),
            cart.len(),
            cart.subtotal().display()
        );
    }

    Ok(())
}
