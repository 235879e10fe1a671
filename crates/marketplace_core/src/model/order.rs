//! Order record and inputs.
//!
//! # Invariants
//! - `name` is always present.
//! - `customer_id`/`executor_id`, when set, point at existing users.
//! - No ordering is enforced between `start_date` and `end_date`.

use super::patch_field;
use super::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate key of an `orders` row.
pub type OrderId = i64;

/// Persisted order projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub price: Option<i64>,
    pub customer_id: Option<UserId>,
    pub executor_id: Option<UserId>,
}

/// Input for create.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub price: Option<i64>,
    pub customer_id: Option<UserId>,
    pub executor_id: Option<UserId>,
}

impl OrderPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Input for full-replace update: all eight keys must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderReplace {
    #[serde(default, deserialize_with = "patch_field")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub customer_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub executor_id: Option<Option<UserId>>,
}

/// An unset `name` stays absent; unset optional fields become `null`.
impl From<OrderPayload> for OrderReplace {
    fn from(payload: OrderPayload) -> Self {
        Self {
            name: payload.name.map(Some),
            description: Some(payload.description),
            start_date: Some(payload.start_date),
            end_date: Some(payload.end_date),
            address: Some(payload.address),
            price: Some(payload.price),
            customer_id: Some(payload.customer_id),
            executor_id: Some(payload.executor_id),
        }
    }
}

/// Partial update. `None` leaves a column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderPatch {
    #[serde(default, deserialize_with = "patch_field")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub customer_id: Option<Option<UserId>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub executor_id: Option<Option<UserId>>,
}
