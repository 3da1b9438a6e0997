use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppError,
    models::{
        auth::{
            AccessTokenResponse, ActivationResponse, CheckCodeRequest, CreateNewPasswordRequest,
            EmailRequest, LoginRequest, RefreshTokenRequest, RegisterFactRequest,
            RegisterFactResponse, RegisterRequest, RetryPasswordResponse, TokenPair,
        },
        principal::Principal,
        user::IdResponse,
    },
    state::AppState,
    validation::validated,
};

type HandlerResult<T> = Result<Json<T>, AppError>;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> HandlerResult<TokenPair> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.login(payload).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> HandlerResult<AccessTokenResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.refresh(payload)?))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> HandlerResult<IdResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.register(payload).await?))
}

pub async fn register_fact(
    State(state): State<AppState>,
    payload: Result<Json<RegisterFactRequest>, JsonRejection>,
) -> HandlerResult<RegisterFactResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    let inserted = state.accounts.fact_register(payload.count).await?;
    Ok(Json(RegisterFactResponse { inserted }))
}

pub async fn check_code(
    State(state): State<AppState>,
    payload: Result<Json<CheckCodeRequest>, JsonRejection>,
) -> HandlerResult<ActivationResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.check_code(payload).await?))
}

pub async fn retry_active(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> HandlerResult<IdResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.retry_active(&payload.email).await?))
}

pub async fn retry_password(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> HandlerResult<RetryPasswordResponse> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    Ok(Json(state.accounts.retry_password(&payload.email).await?))
}

pub async fn create_new_password(
    State(state): State<AppState>,
    payload: Result<Json<CreateNewPasswordRequest>, JsonRejection>,
) -> HandlerResult<Value> {
    let Json(payload) = payload?;
    let payload = validated(payload)?;
    state.accounts.create_new_password(payload).await?;
    Ok(Json(json!({})))
}

pub async fn profile(Extension(principal): Extension<Principal>) -> Json<Principal> {
    Json(principal)
}
