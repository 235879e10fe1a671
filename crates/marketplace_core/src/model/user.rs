//! User record and inputs.
//!
//! A user is either side of a deal: `role` carries the free-form
//! customer/executor label, it is not an enum in storage.
//!
//! # Invariants
//! - `first_name`, `last_name` and `role` are always present.
//! - `email` and `phone` are unique across users when not null.

use super::patch_field;
use serde::{Deserialize, Serialize};

/// Surrogate key of a `users` row.
pub type UserId = i64;

/// Persisted user projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub role: String,
    pub phone: Option<String>,
}

/// Input for create.
///
/// Every key is optional at the type level so a missing required key is
/// reported by name instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
}

impl UserPayload {
    /// Payload with the three required fields set.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            role: Some(role.into()),
            ..Self::default()
        }
    }
}

/// Input for full-replace update.
///
/// Every key must be present; `Some(None)` is an explicit `null`, which
/// clears a nullable column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserReplace {
    #[serde(default, deserialize_with = "patch_field")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone: Option<Option<String>>,
}

/// Unset required fields stay absent; unset optional fields become `null`.
impl From<UserPayload> for UserReplace {
    fn from(payload: UserPayload) -> Self {
        Self {
            first_name: payload.first_name.map(Some),
            last_name: payload.last_name.map(Some),
            age: Some(payload.age),
            email: Some(payload.email),
            role: payload.role.map(Some),
            phone: Some(payload.phone),
        }
    }
}

/// Partial update. `None` leaves a column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "patch_field")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub age: Option<Option<i64>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub role: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch_field")]
    pub phone: Option<Option<String>>,
}
