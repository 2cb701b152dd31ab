//! Cart line-items.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Quantity};

/// A product descriptor as handed to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Catalog product id.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

impl NewLineItem {
    /// Create a new line-item descriptor.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Price,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }

    /// Turn the descriptor into a line-item holding `quantity` units.
    #[must_use]
    pub fn with_quantity(self, quantity: Quantity) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity,
        }
    }
}

/// A single product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog product id. Unique within a cart.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Units in the cart, always at least one.
    pub quantity: Quantity,
}

impl LineItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * self.quantity
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        item.with_quantity(Quantity::ONE)
    }
}
