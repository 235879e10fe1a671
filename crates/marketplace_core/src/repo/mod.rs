//! Repository layer: one CRUD contract per marketplace entity.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for users, orders, offers.
//! - Orchestrate validator and store calls for every operation.
//!
//! # Invariants
//! - Every mutating call runs in exactly one store transaction.
//! - Validation completes before the first write of that transaction.
//! - Errors from validator and store are returned unchanged, never swallowed.

pub mod offer_repo;
pub mod order_repo;
pub mod user_repo;
