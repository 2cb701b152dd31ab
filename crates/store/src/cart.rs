//! The cart value and the pure reducer that mutates it.
//!
//! Every change to a cart is expressed as a [`CartAction`] and applied with
//! [`Cart::apply`]. The store serializes actions through a single worker, so
//! each one sees the state left by the previous one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use pocket_cart_core::{LineItem, NewLineItem, Price, ProductId, Quantity};

/// What decrementing a line-item with a single unit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecrementPolicy {
    /// Remove the line-item from the cart.
    #[default]
    Remove,
    /// Keep the line-item at quantity one.
    Clamp,
}

impl DecrementPolicy {
    /// Returns the policy name as used in configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Clamp => "clamp",
        }
    }
}

impl std::fmt::Display for DecrementPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DecrementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!(
                "unknown decrement policy '{other}' (expected remove or clamp)"
            )),
        }
    }
}

/// A mutation of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product, appending it if it is not in the cart yet.
    Add(NewLineItem),
    /// Add one unit of a product already in the cart.
    Increment(ProductId),
    /// Take one unit of a product away.
    Decrement(ProductId),
    /// Drop a product from the cart regardless of quantity.
    Remove(ProductId),
    /// Empty the cart.
    Clear,
}

impl CartAction {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Increment(_) => "increment",
            Self::Decrement(_) => "decrement",
            Self::Remove(_) => "remove",
            Self::Clear => "clear",
        }
    }
}

/// An ordered list of line-items, at most one per product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line-items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consume the cart and return its line-items.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Look up a line-item by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether a product is in the cart.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct line-items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line-items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line-items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Apply an action in place.
    ///
    /// Returns `true` if the cart changed. Actions naming a product that is
    /// not in the cart are no-ops.
    pub fn apply(&mut self, action: CartAction, policy: DecrementPolicy) -> bool {
        match action {
            CartAction::Add(item) => {
                if let Some(existing) = self.position(&item.id) {
                    self.increment_at(existing);
                } else {
                    self.items.push(LineItem::from(item));
                }
                true
            }
            CartAction::Increment(id) => self.position(&id).is_some_and(|index| {
                self.increment_at(index);
                true
            }),
            CartAction::Decrement(id) => {
                let Some(index) = self.position(&id) else {
                    debug!(product_id = %id, "Decrement of product not in cart");
                    return false;
                };
                self.decrement_at(index, policy)
            }
            CartAction::Remove(id) => {
                let before = self.items.len();
                self.items.retain(|item| item.id != id);
                before != self.items.len()
            }
            CartAction::Clear => {
                let changed = !self.items.is_empty();
                self.items.clear();
                changed
            }
        }
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    fn increment_at(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            item.quantity = item.quantity.incremented();
        }
    }

    fn decrement_at(&mut self, index: usize, policy: DecrementPolicy) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        match (item.quantity.decremented(), policy) {
            (Some(quantity), _) => {
                item.quantity = quantity;
                true
            }
            (None, DecrementPolicy::Remove) => {
                self.items.remove(index);
                true
            }
            (None, DecrementPolicy::Clamp) => false,
        }
    }

    /// Serialize to the stored JSON layout (an array of line-items).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.items)
    }

    /// Parse a stored JSON blob.
    ///
    /// Blobs written by older clients may hold the same product more than once
    /// or quantities of zero or less. Those are normalized: duplicates are
    /// merged into the first occurrence, non-positive quantities are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not a JSON array of line-items.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let stored: Vec<StoredLineItem> = serde_json::from_str(json)?;
        Ok(Self::normalize(stored))
    }

    fn normalize(entries: Vec<StoredLineItem>) -> Self {
        let mut cart = Self::new();
        for stored in entries {
            let Some(quantity) = stored.quantity() else {
                debug!(
                    product_id = %stored.item.id,
                    quantity = stored.quantity,
                    "Dropping stored line-item without units"
                );
                continue;
            };
            if let Some(index) = cart.position(&stored.item.id) {
                if let Some(existing) = cart.items.get_mut(index) {
                    existing.quantity = existing.quantity.saturating_add(quantity);
                }
            } else {
                cart.items.push(stored.item.with_quantity(quantity));
            }
        }
        cart
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A line-item as found in storage, before its quantity is validated.
#[derive(Debug, Deserialize)]
struct StoredLineItem {
    #[serde(flatten)]
    item: NewLineItem,
    quantity: i64,
}

impl StoredLineItem {
    fn quantity(&self) -> Option<Quantity> {
        u32::try_from(self.quantity).ok().and_then(Quantity::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn product(s: &str, cents: i64) -> NewLineItem {
        NewLineItem::new(id(s), format!("Product {s}"), "u", Price::from_cents(cents).unwrap())
    }

    fn cart_with(entries: &[(&str, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (s, qty) in entries {
            cart.apply(CartAction::Add(product(s, 1000)), DecrementPolicy::Remove);
            for _ in 1..*qty {
                cart.apply(CartAction::Increment(id(s)), DecrementPolicy::Remove);
            }
        }
        cart
    }

    fn quantities(cart: &Cart) -> Vec<(String, u32)> {
        cart.items()
            .iter()
            .map(|item| (item.id.to_string(), item.quantity.get()))
            .collect()
    }

    // =========================================================================
    // Add
    // =========================================================================

    #[test]
    fn test_add_absent_item_appends_with_one_unit() {
        let mut cart = cart_with(&[("x", 2)]);
        assert!(cart.apply(CartAction::Add(product("a", 1000)), DecrementPolicy::Remove));
        assert_eq!(quantities(&cart), vec![("x".into(), 2), ("a".into(), 1)]);
    }

    #[test]
    fn test_add_existing_item_increments_instead_of_duplicating() {
        let mut cart = Cart::new();
        let shirt = NewLineItem::new(id("a"), "Shirt", "u", Price::from_cents(1000).unwrap());
        cart.apply(CartAction::Add(shirt.clone()), DecrementPolicy::Remove);
        cart.apply(CartAction::Add(shirt), DecrementPolicy::Remove);

        assert_eq!(cart.len(), 1);
        let line = cart.get(&id("a")).unwrap();
        assert_eq!(line.quantity.get(), 2);
        assert_eq!(line.title, "Shirt");
        assert_eq!(line.price, Price::from_cents(1000).unwrap());
    }

    // =========================================================================
    // Increment / Decrement
    // =========================================================================

    #[test]
    fn test_increment_touches_only_target() {
        let mut cart = cart_with(&[("a", 1), ("b", 4), ("c", 2)]);
        assert!(cart.apply(CartAction::Increment(id("b")), DecrementPolicy::Remove));
        assert_eq!(
            quantities(&cart),
            vec![("a".into(), 1), ("b".into(), 5), ("c".into(), 2)]
        );
    }

    #[test]
    fn test_increment_unknown_id_is_noop() {
        let mut cart = cart_with(&[("a", 1)]);
        let before = cart.clone();
        assert!(!cart.apply(CartAction::Increment(id("nonexistent")), DecrementPolicy::Remove));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_unknown_id_is_noop() {
        let mut cart = cart_with(&[("a", 1)]);
        let before = cart.clone();
        assert!(!cart.apply(CartAction::Decrement(id("zzz")), DecrementPolicy::Clamp));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrement_to_zero_removes_under_remove_policy() {
        let mut cart = cart_with(&[("a", 2)]);
        cart.apply(CartAction::Decrement(id("a")), DecrementPolicy::Remove);
        assert_eq!(quantities(&cart), vec![("a".into(), 1)]);

        assert!(cart.apply(CartAction::Decrement(id("a")), DecrementPolicy::Remove));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_decrement_to_zero_clamps_under_clamp_policy() {
        let mut cart = cart_with(&[("a", 2)]);
        cart.apply(CartAction::Decrement(id("a")), DecrementPolicy::Clamp);
        assert_eq!(quantities(&cart), vec![("a".into(), 1)]);

        assert!(!cart.apply(CartAction::Decrement(id("a")), DecrementPolicy::Clamp));
        assert_eq!(quantities(&cart), vec![("a".into(), 1)]);
    }

    #[test]
    fn test_decrement_remove_keeps_order_of_others() {
        let mut cart = cart_with(&[("a", 1), ("b", 1), ("c", 1)]);
        cart.apply(CartAction::Decrement(id("b")), DecrementPolicy::Remove);
        assert_eq!(quantities(&cart), vec![("a".into(), 1), ("c".into(), 1)]);
    }

    // =========================================================================
    // Remove / Clear
    // =========================================================================

    #[test]
    fn test_remove_drops_whole_line() {
        let mut cart = cart_with(&[("a", 3), ("b", 1)]);
        assert!(cart.apply(CartAction::Remove(id("a")), DecrementPolicy::Remove));
        assert_eq!(quantities(&cart), vec![("b".into(), 1)]);
        assert!(!cart.apply(CartAction::Remove(id("a")), DecrementPolicy::Remove));
    }

    #[test]
    fn test_clear() {
        let mut cart = cart_with(&[("a", 3), ("b", 1)]);
        assert!(cart.apply(CartAction::Clear, DecrementPolicy::Remove));
        assert!(cart.is_empty());
        assert!(!cart.apply(CartAction::Clear, DecrementPolicy::Remove));
    }

    // =========================================================================
    // Totals
    // =========================================================================

    #[test]
    fn test_item_count_and_subtotal() {
        let mut cart = Cart::new();
        cart.apply(CartAction::Add(product("a", 1000)), DecrementPolicy::Remove);
        cart.apply(CartAction::Add(product("a", 1000)), DecrementPolicy::Remove);
        cart.apply(CartAction::Add(product("b", 250)), DecrementPolicy::Remove);

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Price::from_cents(2250).unwrap());
        assert_eq!(Cart::new().subtotal(), Price::ZERO);
    }

    // =========================================================================
    // Stored layout
    // =========================================================================

    #[test]
    fn test_json_roundtrip() {
        let cart = cart_with(&[("a", 2), ("b", 1)]);
        let json = cart.to_json().unwrap();
        assert_eq!(Cart::from_json(&json).unwrap(), cart);
    }

    #[test]
    fn test_stored_layout_is_plain_array() {
        let cart = cart_with(&[("a", 2)]);
        let value: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["quantity"], 2);
    }

    #[test]
    fn test_from_json_merges_duplicates() {
        let json = r#"[
            {"id":"a","title":"Shirt","image_url":"u","price":10,"quantity":2},
            {"id":"b","title":"Hat","image_url":"v","price":5,"quantity":1},
            {"id":"a","title":"Shirt","image_url":"u","price":10,"quantity":1}
        ]"#;
        let cart = Cart::from_json(json).unwrap();
        assert_eq!(quantities(&cart), vec![("a".into(), 3), ("b".into(), 1)]);
    }

    #[test]
    fn test_from_json_drops_non_positive_quantities() {
        let json = r#"[
            {"id":"a","title":"Shirt","imageUrl":"u","price":10,"quantity":0},
            {"id":"b","title":"Hat","imageUrl":"v","price":5,"quantity":-2},
            {"id":"c","title":"Sock","imageUrl":"w","price":1,"quantity":1}
        ]"#;
        let cart = Cart::from_json(json).unwrap();
        assert_eq!(quantities(&cart), vec![("c".into(), 1)]);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(Cart::from_json("not json").is_err());
        assert!(Cart::from_json(r#"{"id":"a"}"#).is_err());
        assert!(Cart::from_json(r#"[{"id":"a"}]"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_negative_price() {
        let blob = r#"[{"id":"a","title":"Shirt","image_url":"u","price":-10,"quantity":1}]"#;
        assert!(Cart::from_json(blob).is_err());
    }

    #[test]
    fn test_decrement_policy_parse() {
        assert_eq!("remove".parse::<DecrementPolicy>().unwrap(), DecrementPolicy::Remove);
        assert_eq!(" CLAMP ".parse::<DecrementPolicy>().unwrap(), DecrementPolicy::Clamp);
        assert!("floor".parse::<DecrementPolicy>().is_err());
    }
}
