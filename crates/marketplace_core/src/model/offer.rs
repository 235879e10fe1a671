//! Offer record and inputs: an executor's bid on an order.
//!
//! Several offers by the same executor on the same order are allowed.

use super::order::OrderId;
use super::patch_field;
use super::user::UserId;
use serde::{Deserialize, Serialize};

/// Surrogate key of an `offers` row.
pub type OfferId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub order_id: OrderId,
    pub executor_id: UserId,
}

/// Input for create and full-replace update. Both references are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferPayload {
    pub order_id: Option<OrderId>,
    pub executor_id: Option<UserId>,
}

impl OfferPayload {
    pub fn new(order_id: OrderId, executor_id: UserId) -> Self {
        Self {
            order_id: Some(order_id),
            executor_id: Some(executor_id),
        }
    }
}

/// Partial update. An explicit `null` is rejected since both columns are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct OfferPatch {
    #[serde(default, deserialize_with = "patch_field")]
    pub order_id: Option<Option<OrderId>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub executor_id: Option<Option<UserId>>,
}
