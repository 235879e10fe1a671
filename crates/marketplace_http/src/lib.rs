//! HTTP surface for the marketplace service.
//!
//! # Responsibility
//! - Route JSON CRUD requests for users, orders and offers onto the
//!   `marketplace_core` repositories.
//! - Map repository outcomes onto status codes and one error body shape.
//!
//! # Invariants
//! - Handlers never touch SQLite on the async executor; every repository
//!   call runs on the blocking pool with its own connection.
//! - Storage faults are logged and answered with an opaque 500.

use axum::routing::get;
use axum::{Json, Router};
use marketplace_core::{core_version, Store};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod offers;
pub mod orders;
pub mod state;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Body returned by create and delete: the affected record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordId {
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
}

/// Builds the service router over an opened store.
pub fn router(store: Store) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::patch_user)
                .delete(users::delete_user),
        )
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .patch(orders::patch_order)
                .delete(orders::delete_order),
        )
        .route("/offers", get(offers::list_offers).post(offers::create_offer))
        .route(
            "/offers/{id}",
            get(offers::get_offer)
                .put(offers::update_offer)
                .patch(offers::patch_offer)
                .delete(offers::delete_offer),
        )
        .with_state(AppState::new(store))
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: core_version(),
    })
}
