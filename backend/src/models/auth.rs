//! Request and response payloads of the `/auth` endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::UserId;
use crate::validation::rules;

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Authentication tokens returned after a successful login.
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "refreshToken must not be empty"))]
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Self-service registration payload.
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Bulk generation of synthetic inactive accounts.
pub struct RegisterFactRequest {
    #[validate(range(min = 1, max = 10000, message = "count must be between 1 and 10000"))]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisterFactResponse {
    pub inserted: u64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Activation attempt: account id plus the code from the email.
pub struct CheckCodeRequest {
    #[validate(custom(function = "rules::validate_user_id"))]
    pub id: String,
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResponse {
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
/// Body of the retry endpoints.
pub struct EmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RetryPasswordResponse {
    pub id: UserId,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Completes a password reset with the code from the reset email.
pub struct CreateNewPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "code must not be empty"))]
    pub code: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[validate(length(min = 1, message = "confirmPassword must not be empty"))]
    pub confirm_password: String,
}
