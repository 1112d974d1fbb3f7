//! Cart Records

use jiff::Timestamp;
use serde::Serialize;

use crate::{
    domain::{products::records::ProductUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
///
/// Lines are ordered by the time they were first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    /// Sum of every line's `quantity * unit_price`, `None` on overflow.
    #[must_use]
    pub fn total(&self) -> Option<u64> {
        calculate_total(&self.items)
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u32,
    /// Product price captured when the line was created.
    pub unit_price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// Total over a set of cart lines using their price snapshots.
#[must_use]
pub fn calculate_total(items: &[CartItemRecord]) -> Option<u64> {
    items
        .iter()
        .try_fold(0_u64, |total, item| total.checked_add(item.line_total()?))
}
