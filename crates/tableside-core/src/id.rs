//! # Prefixed Identifiers
//!
//! Every entity id is a type prefix followed by a UUID v7 in simple hex form:
//!
//! ```text
//! order_0190b8c1e2a47c3d9f1e5b6a7c8d9e0f
//! └─┬──┘└──────────────┬───────────────┘
//!  type     time-ordered, sorts by creation
//! ```

use uuid::Uuid;

/// A type-discriminating id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPrefix(&'static str);

impl IdPrefix {
    pub const ORDER: IdPrefix = IdPrefix("order_");
    pub const ITEM: IdPrefix = IdPrefix("item_");
    pub const STORE: IdPrefix = IdPrefix("store_");
    pub const SEAT: IdPrefix = IdPrefix("seat_");

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Generates a new id carrying this prefix.
    pub fn generate(&self) -> String {
        format!("{}{}", self.0, Uuid::now_v7().simple())
    }

    /// Checks that `id` carries this prefix and something after it.
    pub fn matches(&self, id: &str) -> bool {
        id.len() > self.0.len() && id.starts_with(self.0)
    }
}
