//! Pocket Cart Core - Shared types library.
//!
//! This crate provides the domain types used across all Pocket Cart components:
//! - `pocket-cart` - The cart store and its storage backends
//! - `pocket-cart-cli` - Command-line driver for a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices, quantities, and line-items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
