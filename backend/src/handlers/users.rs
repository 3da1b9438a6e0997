use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        pagination::{Page, PageRequest},
        principal::Principal,
        user::{CreateUserRequest, IdResponse, UpdateUserRequest, UserListQuery, UserResponse},
    },
    services::{users::parse_id, DeleteOutcome},
    state::AppState,
    validation::validated,
};

pub async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<IdResponse>, AppError> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.users.create(&principal, payload).await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<UserListQuery>, QueryRejection>,
) -> Result<Json<Page<UserResponse>>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;
    let request = PageRequest::new(query.page_number, query.page_size);
    Ok(Json(state.users.list(&query.filter(), request).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.users.find_by_id(id).await?))
}

pub async fn get_user_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.users.find_by_email(&email).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.users.update(&principal, payload).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let response = match state.users.remove(&principal, &id).await? {
        DeleteOutcome::Deleted(user) => Json(user).into_response(),
        DeleteOutcome::NotFound => Json(json!({ "message": "User not found" })).into_response(),
    };
    Ok(response)
}
