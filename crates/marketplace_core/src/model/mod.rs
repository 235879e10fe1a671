//! Marketplace domain model: users, orders and offers.
//!
//! # Responsibility
//! - Define the persisted record shapes and their payload/patch inputs.
//! - Name each entity kind and the table that stores it.
//!
//! # Invariants
//! - Every record is identified by a surrogate `i64` id assigned by storage.
//! - Order and Offer hold non-owning references to User/Order ids.
//! - Payload and patch types carry no validation; see `crate::validate`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

pub mod offer;
pub mod order;
pub mod user;

/// Persisted record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Order,
    Offer,
}

impl EntityKind {
    /// Table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Order => "orders",
            Self::Offer => "offers",
        }
    }

    /// Lowercase label used in messages and log events.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Order => "order",
            Self::Offer => "offer",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Deserializes a patch field so that an absent key stays `None` while an
/// explicit `null` becomes `Some(None)`.
///
/// Must be paired with `#[serde(default)]` on the field.
pub(crate) fn patch_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
