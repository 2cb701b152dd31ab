//! Core types for Pocket Cart.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod quantity;

pub use id::{ProductId, ProductIdError};
pub use line_item::{LineItem, NewLineItem};
pub use price::{Price, PriceError};
pub use quantity::Quantity;
