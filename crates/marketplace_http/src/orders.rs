//! `/orders` handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use crate::RecordId;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::{
    Order, OrderId, OrderPatch, OrderPayload, OrderReplace, OrderRepository,
    SqliteOrderRepository,
};

pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<Order>>> {
    let orders = state
        .run(|conn| SqliteOrderRepository::new(conn).list_orders())
        .await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
) -> ApiResult<Json<Order>> {
    let Path(id) = id?;
    let order = state
        .run(move |conn| SqliteOrderRepository::new(conn).get_order(id))
        .await?;
    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordId>)> {
    let Json(payload) = payload?;
    let id = state
        .run(move |conn| SqliteOrderRepository::new(conn).create_order(&payload))
        .await?;
    Ok((StatusCode::CREATED, Json(RecordId { id })))
}

pub async fn update_order(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
    replace: Result<Json<OrderReplace>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let Path(id) = id?;
    let Json(replace) = replace?;
    let order = state
        .run(move |conn| SqliteOrderRepository::new(conn).update_order(id, &replace))
        .await?;
    Ok(Json(order))
}

pub async fn patch_order(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
    patch: Result<Json<OrderPatch>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let order = state
        .run(move |conn| SqliteOrderRepository::new(conn).patch_order(id, &patch))
        .await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
) -> ApiResult<Json<RecordId>> {
    let Path(id) = id?;
    state
        .run(move |conn| SqliteOrderRepository::new(conn).delete_order(id))
        .await?;
    Ok(Json(RecordId { id }))
}
