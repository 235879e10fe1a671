//! `/users` handlers.

use crate::error::ApiResult;
use crate::state::AppState;
use crate::RecordId;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use marketplace_core::{
    SqliteUserRepository, User, UserId, UserPatch, UserPayload, UserReplace, UserRepository,
};

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state
        .run(|conn| SqliteUserRepository::new(conn).list_users())
        .await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let user = state
        .run(move |conn| SqliteUserRepository::new(conn).get_user(id))
        .await?;
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordId>)> {
    let Json(payload) = payload?;
    let id = state
        .run(move |conn| SqliteUserRepository::new(conn).create_user(&payload))
        .await?;
    Ok((StatusCode::CREATED, Json(RecordId { id })))
}

pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    replace: Result<Json<UserReplace>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(replace) = replace?;
    let user = state
        .run(move |conn| SqliteUserRepository::new(conn).update_user(id, &replace))
        .await?;
    Ok(Json(user))
}

pub async fn patch_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    patch: Result<Json<UserPatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let user = state
        .run(move |conn| SqliteUserRepository::new(conn).patch_user(id, &patch))
        .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> ApiResult<Json<RecordId>> {
    let Path(id) = id?;
    state
        .run(move |conn| SqliteUserRepository::new(conn).delete_user(id))
        .await?;
    Ok(Json(RecordId { id }))
}
