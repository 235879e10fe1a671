//! Order repository contract and SQLite implementation.
//!
//! # Invariants
//! - `customer_id`/`executor_id` are resolved against `users` inside the
//!   write transaction when set.
//! - Deleting an order removes its offers.

use crate::model::order::{Order, OrderId, OrderPatch, OrderPayload, OrderReplace};
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::store::{self, with_transaction, Record, RepoResult};
use crate::validate;
use rusqlite::{Connection, Row};

impl Record for Order {
    const KIND: EntityKind = EntityKind::Order;
    const COLUMNS: &'static str = "id, name, description, start_date, end_date, address, price, customer_id, executor_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            address: row.get("address")?,
            price: row.get("price")?,
            customer_id: row.get("customer_id")?,
            executor_id: row.get("executor_id")?,
        })
    }
}

/// Repository interface for order CRUD operations.
pub trait OrderRepository {
    fn list_orders(&self) -> RepoResult<Vec<Order>>;
    fn get_order(&self, id: OrderId) -> RepoResult<Order>;
    fn create_order(&mut self, payload: &OrderPayload) -> RepoResult<OrderId>;
    /// Replaces all eight mutable fields; every key must be present.
    fn update_order(&mut self, id: OrderId, replace: &OrderReplace) -> RepoResult<Order>;
    fn patch_order(&mut self, id: OrderId, patch: &OrderPatch) -> RepoResult<Order>;
    fn delete_order(&mut self, id: OrderId) -> RepoResult<()>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn list_orders(&self) -> RepoResult<Vec<Order>> {
        store::list_all(self.conn)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Order> {
        store::get(self.conn, id)
    }

    fn create_order(&mut self, payload: &OrderPayload) -> RepoResult<OrderId> {
        let columns = validate::order_columns(payload)?;
        with_transaction(self.conn, "order_create", |tx| {
            check_parties(tx, payload.customer_id, payload.executor_id)?;
            store::insert(tx, EntityKind::Order, &columns)
        })
    }

    fn update_order(&mut self, id: OrderId, replace: &OrderReplace) -> RepoResult<Order> {
        let columns = validate::order_replace_columns(replace)?;
        with_transaction(self.conn, "order_update", |tx| {
            store::ensure_exists(tx, EntityKind::Order, id)?;
            check_parties(tx, replace.customer_id.flatten(), replace.executor_id.flatten())?;
            store::update(tx, EntityKind::Order, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn patch_order(&mut self, id: OrderId, patch: &OrderPatch) -> RepoResult<Order> {
        let columns = validate::order_patch_columns(patch)?;
        with_transaction(self.conn, "order_patch", |tx| {
            store::ensure_exists(tx, EntityKind::Order, id)?;
            check_parties(tx, patch.customer_id.flatten(), patch.executor_id.flatten())?;
            store::update(tx, EntityKind::Order, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn delete_order(&mut self, id: OrderId) -> RepoResult<()> {
        with_transaction(self.conn, "order_delete", |tx| {
            store::delete(tx, EntityKind::Order, id)
        })
    }
}

fn check_parties(
    conn: &Connection,
    customer_id: Option<UserId>,
    executor_id: Option<UserId>,
) -> RepoResult<()> {
    validate::check_reference(conn, "customer_id", EntityKind::User, customer_id)?;
    validate::check_reference(conn, "executor_id", EntityKind::User, executor_id)
}
