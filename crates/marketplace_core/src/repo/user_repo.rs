//! User repository contract and SQLite implementation.
//!
//! # Invariants
//! - `email` and `phone` stay unique across users; the check runs in the
//!   same transaction as the write.
//! - Deleting a user nullifies order references to it and removes its offers.

use crate::model::user::{User, UserId, UserPatch, UserPayload, UserReplace};
use crate::model::EntityKind;
use crate::store::{self, with_transaction, Record, RepoResult};
use crate::validate;
use rusqlite::{Connection, Row};

impl Record for User {
    const KIND: EntityKind = EntityKind::User;
    const COLUMNS: &'static str = "id, first_name, last_name, age, email, role, phone";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            age: row.get("age")?,
            email: row.get("email")?,
            role: row.get("role")?,
            phone: row.get("phone")?,
        })
    }
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    fn list_users(&self) -> RepoResult<Vec<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<User>;
    /// Creates one user and returns its new id.
    fn create_user(&mut self, payload: &UserPayload) -> RepoResult<UserId>;
    /// Replaces all six fields; every key must be present.
    fn update_user(&mut self, id: UserId, replace: &UserReplace) -> RepoResult<User>;
    /// Writes only the fields present in `patch`.
    fn patch_user(&mut self, id: UserId, patch: &UserPatch) -> RepoResult<User>;
    fn delete_user(&mut self, id: UserId) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn list_users(&self) -> RepoResult<Vec<User>> {
        store::list_all(self.conn)
    }

    fn get_user(&self, id: UserId) -> RepoResult<User> {
        store::get(self.conn, id)
    }

    fn create_user(&mut self, payload: &UserPayload) -> RepoResult<UserId> {
        let columns = validate::user_columns(payload)?;
        with_transaction(self.conn, "user_create", |tx| {
            check_contacts(tx, payload.email.as_deref(), payload.phone.as_deref(), None)?;
            store::insert(tx, EntityKind::User, &columns)
        })
    }

    fn update_user(&mut self, id: UserId, replace: &UserReplace) -> RepoResult<User> {
        let columns = validate::user_replace_columns(replace)?;
        with_transaction(self.conn, "user_update", |tx| {
            store::ensure_exists(tx, EntityKind::User, id)?;
            check_contacts(
                tx,
                replace.email.as_ref().and_then(Option::as_deref),
                replace.phone.as_ref().and_then(Option::as_deref),
                Some(id),
            )?;
            store::update(tx, EntityKind::User, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn patch_user(&mut self, id: UserId, patch: &UserPatch) -> RepoResult<User> {
        let columns = validate::user_patch_columns(patch)?;
        with_transaction(self.conn, "user_patch", |tx| {
            store::ensure_exists(tx, EntityKind::User, id)?;
            check_contacts(
                tx,
                patch.email.as_ref().and_then(Option::as_deref),
                patch.phone.as_ref().and_then(Option::as_deref),
                Some(id),
            )?;
            store::update(tx, EntityKind::User, id, &columns)?;
            store::get(tx, id)
        })
    }

    fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        with_transaction(self.conn, "user_delete", |tx| {
            store::delete(tx, EntityKind::User, id)
        })
    }
}

fn check_contacts(
    conn: &Connection,
    email: Option<&str>,
    phone: Option<&str>,
    owner: Option<UserId>,
) -> RepoResult<()> {
    validate::check_unique(conn, EntityKind::User, "email", email, owner)?;
    validate::check_unique(conn, EntityKind::User, "phone", phone, owner)
}
