//! Input validation ahead of every mutation.
//!
//! # Responsibility
//! - Reject payloads missing a required field, naming that field.
//! - Enforce column length limits.
//! - Turn validated payloads/patches into the column set the store writes.
//! - Resolve references and unique values against the current transaction.
//!
//! # Invariants
//! - Structural checks run before a transaction is opened.
//! - Reference and uniqueness checks run inside the mutating transaction.
//! - Full-replace validation requires every key; patch validation only
//!   looks at supplied fields.

use crate::model::offer::{OfferPatch, OfferPayload};
use crate::model::order::{OrderPatch, OrderPayload, OrderReplace};
use crate::model::user::{UserPatch, UserPayload, UserReplace};
use crate::model::EntityKind;
use crate::store::{self, Column, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NAME_MAX_CHARS: usize = 200;
pub const ROLE_MAX_CHARS: usize = 200;
pub const PHONE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const ADDRESS_MAX_CHARS: usize = 500;

/// Structural payload error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Key absent from a create or full-replace payload.
    MissingField(&'static str),
    /// Replace or patch sets a required column to `null`.
    NullRequired(&'static str),
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) | Self::NullRequired(field) => field,
            Self::TooLong { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::NullRequired(field) => write!(f, "field `{field}` cannot be null"),
            Self::TooLong { field, max, actual } => write!(
                f,
                "field `{field}` exceeds {max} characters (got {actual})"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Validates a user create payload into its full column set.
pub fn user_columns(payload: &UserPayload) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::with_capacity(6);
    let first_name = required_text(&payload.first_name, "first_name")?;
    push_text(&mut columns, "first_name", first_name, NAME_MAX_CHARS)?;
    let last_name = required_text(&payload.last_name, "last_name")?;
    push_text(&mut columns, "last_name", last_name, NAME_MAX_CHARS)?;
    columns.push(("age", Value::from(payload.age)));
    push_optional_text(&mut columns, "email", &payload.email, None)?;
    let role = required_text(&payload.role, "role")?;
    push_text(&mut columns, "role", role, ROLE_MAX_CHARS)?;
    push_optional_text(&mut columns, "phone", &payload.phone, Some(PHONE_MAX_CHARS))?;
    Ok(columns)
}

/// Validates a full-replace user payload: every key present, required ones
/// non-null.
pub fn user_replace_columns(replace: &UserReplace) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::with_capacity(6);
    let first_name = replaced_text(&replace.first_name, "first_name")?;
    push_text(&mut columns, "first_name", first_name, NAME_MAX_CHARS)?;
    let last_name = replaced_text(&replace.last_name, "last_name")?;
    push_text(&mut columns, "last_name", last_name, NAME_MAX_CHARS)?;
    columns.push(("age", Value::from(replaced(&replace.age, "age")?)));
    let email = replaced(&replace.email, "email")?;
    push_optional_text(&mut columns, "email", &email, None)?;
    let role = replaced_text(&replace.role, "role")?;
    push_text(&mut columns, "role", role, ROLE_MAX_CHARS)?;
    let phone = replaced(&replace.phone, "phone")?;
    push_optional_text(&mut columns, "phone", &phone, Some(PHONE_MAX_CHARS))?;
    Ok(columns)
}

/// Validates a user patch into the columns it touches.
pub fn user_patch_columns(patch: &UserPatch) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::new();
    if let Some(value) = &patch.first_name {
        let value = non_null_text(value, "first_name")?;
        push_text(&mut columns, "first_name", value, NAME_MAX_CHARS)?;
    }
    if let Some(value) = &patch.last_name {
        let value = non_null_text(value, "last_name")?;
        push_text(&mut columns, "last_name", value, NAME_MAX_CHARS)?;
    }
    if let Some(value) = patch.age {
        columns.push(("age", Value::from(value)));
    }
    if let Some(value) = &patch.email {
        push_optional_text(&mut columns, "email", value, None)?;
    }
    if let Some(value) = &patch.role {
        let value = non_null_text(value, "role")?;
        push_text(&mut columns, "role", value, ROLE_MAX_CHARS)?;
    }
    if let Some(value) = &patch.phone {
        push_optional_text(&mut columns, "phone", value, Some(PHONE_MAX_CHARS))?;
    }
    Ok(columns)
}

/// Validates an order create payload into its full column set.
pub fn order_columns(payload: &OrderPayload) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::with_capacity(8);
    let name = required_text(&payload.name, "name")?;
    push_text(&mut columns, "name", name, NAME_MAX_CHARS)?;
    push_optional_text(
        &mut columns,
        "description",
        &payload.description,
        Some(DESCRIPTION_MAX_CHARS),
    )?;
    columns.push(("start_date", date_value(payload.start_date)));
    columns.push(("end_date", date_value(payload.end_date)));
    push_optional_text(&mut columns, "address", &payload.address, Some(ADDRESS_MAX_CHARS))?;
    columns.push(("price", Value::from(payload.price)));
    columns.push(("customer_id", Value::from(payload.customer_id)));
    columns.push(("executor_id", Value::from(payload.executor_id)));
    Ok(columns)
}

/// Validates a full-replace order payload covering all eight fields.
pub fn order_replace_columns(replace: &OrderReplace) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::with_capacity(8);
    let name = replaced_text(&replace.name, "name")?;
    push_text(&mut columns, "name", name, NAME_MAX_CHARS)?;
    let description = replaced(&replace.description, "description")?;
    push_optional_text(
        &mut columns,
        "description",
        &description,
        Some(DESCRIPTION_MAX_CHARS),
    )?;
    let start_date = replaced(&replace.start_date, "start_date")?;
    columns.push(("start_date", date_value(start_date)));
    let end_date = replaced(&replace.end_date, "end_date")?;
    columns.push(("end_date", date_value(end_date)));
    let address = replaced(&replace.address, "address")?;
    push_optional_text(&mut columns, "address", &address, Some(ADDRESS_MAX_CHARS))?;
    columns.push(("price", Value::from(replaced(&replace.price, "price")?)));
    let customer_id = replaced(&replace.customer_id, "customer_id")?;
    columns.push(("customer_id", Value::from(customer_id)));
    let executor_id = replaced(&replace.executor_id, "executor_id")?;
    columns.push(("executor_id", Value::from(executor_id)));
    Ok(columns)
}

/// Validates an order patch into the columns it touches.
pub fn order_patch_columns(patch: &OrderPatch) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::new();
    if let Some(value) = &patch.name {
        let value = non_null_text(value, "name")?;
        push_text(&mut columns, "name", value, NAME_MAX_CHARS)?;
    }
    if let Some(value) = &patch.description {
        push_optional_text(&mut columns, "description", value, Some(DESCRIPTION_MAX_CHARS))?;
    }
    if let Some(value) = patch.start_date {
        columns.push(("start_date", date_value(value)));
    }
    if let Some(value) = patch.end_date {
        columns.push(("end_date", date_value(value)));
    }
    if let Some(value) = &patch.address {
        push_optional_text(&mut columns, "address", value, Some(ADDRESS_MAX_CHARS))?;
    }
    if let Some(value) = patch.price {
        columns.push(("price", Value::from(value)));
    }
    if let Some(value) = patch.customer_id {
        columns.push(("customer_id", Value::from(value)));
    }
    if let Some(value) = patch.executor_id {
        columns.push(("executor_id", Value::from(value)));
    }
    Ok(columns)
}

/// Validates an offer create/replace payload into its full column set.
pub fn offer_columns(payload: &OfferPayload) -> Result<Vec<Column>, ValidationError> {
    let order_id = payload
        .order_id
        .ok_or(ValidationError::MissingField("order_id"))?;
    let executor_id = payload
        .executor_id
        .ok_or(ValidationError::MissingField("executor_id"))?;
    Ok(vec![
        ("order_id", Value::Integer(order_id)),
        ("executor_id", Value::Integer(executor_id)),
    ])
}

/// Validates an offer patch into the columns it touches.
pub fn offer_patch_columns(patch: &OfferPatch) -> Result<Vec<Column>, ValidationError> {
    let mut columns = Vec::new();
    if let Some(value) = patch.order_id {
        let order_id = value.ok_or(ValidationError::NullRequired("order_id"))?;
        columns.push(("order_id", Value::Integer(order_id)));
    }
    if let Some(value) = patch.executor_id {
        let executor_id = value.ok_or(ValidationError::NullRequired("executor_id"))?;
        columns.push(("executor_id", Value::Integer(executor_id)));
    }
    Ok(columns)
}

/// Fails with `ForeignKey` when `id` is set but no `target` row has it.
pub fn check_reference(
    conn: &Connection,
    field: &'static str,
    target: EntityKind,
    id: Option<i64>,
) -> RepoResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    if store::exists(conn, target, id)? {
        return Ok(());
    }
    Err(RepoError::ForeignKey {
        field: field.to_string(),
        id: Some(id),
    })
}

/// Fails with `UniqueViolation` when another row already holds `value`.
///
/// `owner` is the row being updated, which may keep its own value.
pub fn check_unique(
    conn: &Connection,
    kind: EntityKind,
    column: &'static str,
    value: Option<&str>,
    owner: Option<i64>,
) -> RepoResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    match store::find_id_by(conn, kind, column, value)? {
        Some(holder) if Some(holder) != owner => Err(RepoError::UniqueViolation {
            field: column.to_string(),
        }),
        _ => Ok(()),
    }
}

fn required_text<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value.as_deref().ok_or(ValidationError::MissingField(field))
}

fn non_null_text<'a>(
    value: &'a Option<String>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    value.as_deref().ok_or(ValidationError::NullRequired(field))
}

// Full-replace key: absent is `MissingField`, `null` passes through.
fn replaced<T: Clone>(
    value: &Option<Option<T>>,
    field: &'static str,
) -> Result<Option<T>, ValidationError> {
    value.clone().ok_or(ValidationError::MissingField(field))
}

fn replaced_text<'a>(
    value: &'a Option<Option<String>>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    let value = value.as_ref().ok_or(ValidationError::MissingField(field))?;
    non_null_text(value, field)
}

fn push_text(
    columns: &mut Vec<Column>,
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    check_length(field, value, max)?;
    columns.push((field, Value::Text(value.to_string())));
    Ok(())
}

fn push_optional_text(
    columns: &mut Vec<Column>,
    field: &'static str,
    value: &Option<String>,
    max: Option<usize>,
) -> Result<(), ValidationError> {
    if let (Some(text), Some(max)) = (value.as_deref(), max) {
        check_length(field, text, max)?;
    }
    columns.push((field, Value::from(value.clone())));
    Ok(())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

fn date_value(value: Option<NaiveDate>) -> Value {
    match value {
        Some(date) => Value::Text(date.format("%Y-%m-%d").to_string()),
        None => Value::Null,
    }
}
