//! Offer repository contract and SQLite implementation.
//!
//! No rule limits offers per order or per executor.

use crate::model::offer::{Offer, OfferId, OfferPatch, OfferPayload};
use crate::model::order::OrderId;
use crate::model::user::UserId;
use crate::model::EntityKind;
use crate::store::{self, with_transaction, Record, RepoResult};
use crate::validate;
use rusqlite::{Connection, Row};

impl Record for Offer {
    const KIND: EntityKind = EntityKind::Offer;
    const COLUMNS: &'static str = "id, order_id, executor_id";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            order_id: row.get("order_id")?,
            executor_id: row.get("executor_id")?,
        })
    }
}

/// Repository interface for offer CRUD operations.
pub trait OfferRepository {
    fn list_offers(&self) -> RepoResult<Vec<Offer>>;
    fn get_offer(&self, id: OfferId) -> RepoResult<Offer>;
    fn create_offer(&mut self, payload: &OfferPayload) -> RepoResult<OfferId>;
    fn update_offer(&mut self, id: OfferId, payload: &OfferPayload) -> RepoResult<Offer>;
    fn patch_offer(&mut self, id: OfferId, patch: &OfferPatch) -> RepoResult<Offer>;
    fn delete_offer(&mut self, id: OfferId) -> RepoResult<()>;
}

/// SQLite-backed offer repository.
pub struct SqliteOfferRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteOfferRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl OfferRepository for SqliteOfferRepository<'_> {
    fn list_offers(&self) -> RepoResult<Vec<Offer>> {
        store::list_all(self.conn)
    }

    fn get_offer(&self, id: OfferId) -> RepoResult<Offer> {
        store::get(self.conn, id)
    }

    fn create_offer(&mut self, payload: &OfferPayload) -> RepoResult<OfferId> {
        let columns = validate::offer_columns(payload)?;
        with_transaction(self.conn, "offer_create", |tx| {
            check_targets(tx, payload.order_id, payload.executor_id)?;
            store::insert(tx, EntityKind::Offer, &columns)
        })
    }

    fn update_offer(&mut self, id: OfferId, payload: &OfferPayload) -> RepoResult<Offer> {
        let columns = validate::offer_columns(payload)?;
        with_transaction(self.conn, "offer_update", |tx| {
            store::ensure_exists(tx, EntityKind::Offer, id)?;
            check_targets(tx, payload.order_id, payload.executor_id)?;
            store::update(tx, EntityKind::Offer, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn patch_offer(&mut self, id: OfferId, patch: &OfferPatch) -> RepoResult<Offer> {
        let columns = validate::offer_patch_columns(patch)?;
        with_transaction(self.conn, "offer_patch", |tx| {
            store::ensure_exists(tx, EntityKind::Offer, id)?;
            check_targets(tx, patch.order_id.flatten(), patch.executor_id.flatten())?;
            store::update(tx, EntityKind::Offer, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn delete_offer(&mut self, id: OfferId) -> RepoResult<()> {
        with_transaction(self.conn, "offer_delete", |tx| {
            store::delete(tx, EntityKind::Offer, id)
        })
    }
}

fn check_targets(
    conn: &Connection,
    order_id: Option<OrderId>,
    executor_id: Option<UserId>,
) -> RepoResult<()> {
    validate::check_reference(conn, "order_id", EntityKind::Order, order_id)?;
    validate::check_reference(conn, "executor_id", EntityKind::User, executor_id)
}
