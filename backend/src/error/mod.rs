use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Failures of the account workflows. Every variant except `Internal` is a
/// client-facing outcome.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("code is invalid")]
    CodeMismatch,
    #[error("code has expired")]
    CodeExpired,
    #[error("account is already active")]
    AlreadyActive,
    #[error("account is not activated")]
    NotActivated,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccountError::Validation(_)
            | AccountError::CodeMismatch
            | AccountError::CodeExpired
            | AccountError::AlreadyActive
            | AccountError::NotActivated => StatusCode::BAD_REQUEST,
            AccountError::NotFound(_) => StatusCode::NOT_FOUND,
            AccountError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AccountError::InvalidCredentials | AccountError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AccountError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AccountError::Validation(_) => "VALIDATION_ERROR",
            AccountError::NotFound(_) => "NOT_FOUND",
            AccountError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AccountError::CodeMismatch => "CODE_MISMATCH",
            AccountError::CodeExpired => "CODE_EXPIRED",
            AccountError::AlreadyActive => "ALREADY_ACTIVE",
            AccountError::NotActivated => "ACCOUNT_NOT_ACTIVE",
            AccountError::InvalidCredentials => "INVALID_CREDENTIALS",
            AccountError::InvalidToken => "INVALID_TOKEN",
            AccountError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Storage failures surfaced by [`crate::repositories::UserStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique index on `users.email` rejected the write.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AccountError::DuplicateEmail(email),
            StoreError::Database(err) => AccountError::Internal(err.into()),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Account(AccountError),
    Unauthorized(String),
    InternalServerError(anyhow::Error),
    Validation(Vec<String>),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code, details) = match self {
            AppError::Account(AccountError::Internal(err)) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
            AppError::Account(err) => (err.status(), err.to_string(), err.code().to_string(), None),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                msg,
                "UNAUTHORIZED".to_string(),
                None,
            ),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_SERVER_ERROR".to_string(),
                    None,
                )
            }
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(serde_json::json!({ "errors": errors })),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code,
            details,
        });

        (status, body).into_response()
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(msg) => AppError::Validation(vec![msg]),
            other => AppError::Account(other),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let code = e.code.as_ref();
                    format!("{}: {}", field, code)
                })
            })
            .collect();
        AppError::Validation(messages)
    }
}
