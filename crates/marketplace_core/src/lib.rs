//! Core domain logic for the marketplace service.
//! This crate is the single source of truth for entity invariants and
//! referential integrity between users, orders and offers.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
pub mod validate;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::offer::{Offer, OfferId, OfferPatch, OfferPayload};
pub use model::order::{Order, OrderId, OrderPatch, OrderPayload, OrderReplace};
pub use model::user::{User, UserId, UserPatch, UserPayload, UserReplace};
pub use model::EntityKind;
pub use repo::offer_repo::{OfferRepository, SqliteOfferRepository};
pub use repo::order_repo::{OrderRepository, SqliteOrderRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use store::{RepoError, RepoResult, Store};
pub use validate::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
