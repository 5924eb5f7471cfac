//! # Line Item
//!
//! One product line inside an order session. The subtotal is always derived
//! from price and quantity, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::id::IdPrefix;
use crate::money::Money;

/// A product ordered in a given quantity at a given unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// `item_`-prefixed id, generated at creation.
    pub id: String,

    /// Back-reference to the owning order session. Set by the session when
    /// the item is attached; empty until then.
    pub order_id: String,

    pub product_id: String,

    pub quantity: i64,

    /// Unit price in minor units.
    pub price: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// Creates a detached line item.
    ///
    /// Quantity and price are taken as given; callers validate input.
    pub fn new(product_id: impl Into<String>, quantity: i64, price: Money) -> Self {
        let now = Utc::now();
        LineItem {
            id: IdPrefix::ITEM.generate(),
            order_id: String::new(),
            product_id: product_id.into(),
            quantity,
            price,
            created_at: now,
            updated_at: now,
        }
    }

    /// `price × quantity`, computed on every call. `None` if the product
    /// does not fit in an `i64`.
    #[inline]
    pub fn subtotal(&self) -> Option<Money> {
        self.price.checked_mul(self.quantity)
    }
}
