//! `/offers` handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use crate::RecordId;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::{
    Offer, OfferId, OfferPatch, OfferPayload, OfferRepository, SqliteOfferRepository,
};

pub async fn list_offers(State(state): State<AppState>) -> ApiResult<Json<Vec<Offer>>> {
    let offers = state
        .run(|conn| SqliteOfferRepository::new(conn).list_offers())
        .await?;
    Ok(Json(offers))
}

pub async fn get_offer(
    State(state): State<AppState>,
    id: Result<Path<OfferId>, PathRejection>,
) -> ApiResult<Json<Offer>> {
    let Path(id) = id?;
    let offer = state
        .run(move |conn| SqliteOfferRepository::new(conn).get_offer(id))
        .await?;
    Ok(Json(offer))
}

pub async fn create_offer(
    State(state): State<AppState>,
    payload: Result<Json<OfferPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordId>)> {
    let Json(payload) = payload?;
    let id = state
        .run(move |conn| SqliteOfferRepository::new(conn).create_offer(&payload))
        .await?;
    Ok((StatusCode::CREATED, Json(RecordId { id })))
}

pub async fn update_offer(
    State(state): State<AppState>,
    id: Result<Path<OfferId>, PathRejection>,
    payload: Result<Json<OfferPayload>, JsonRejection>,
) -> ApiResult<Json<Offer>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let offer = state
        .run(move |conn| SqliteOfferRepository::new(conn).update_offer(id, &payload))
        .await?;
    Ok(Json(offer))
}

pub async fn patch_offer(
    State(state): State<AppState>,
    id: Result<Path<OfferId>, PathRejection>,
    patch: Result<Json<OfferPatch>, JsonRejection>,
) -> ApiResult<Json<Offer>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let offer = state
        .run(move |conn| SqliteOfferRepository::new(conn).patch_offer(id, &patch))
        .await?;
    Ok(Json(offer))
}

pub async fn delete_offer(
    State(state): State<AppState>,
    id: Result<Path<OfferId>, PathRejection>,
) -> ApiResult<Json<RecordId>> {
    let Path(id) = id?;
    state
        .run(move |conn| SqliteOfferRepository::new(conn).delete_offer(id))
        .await?;
    Ok(Json(RecordId { id }))
}
