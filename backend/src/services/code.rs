//! Time-limited activation and password-reset codes stored on the user record.
//!
//! A user holds at most one code. Issuing a new one overwrites `code_id` and
//! `code_expired`; consuming a code leaves it in place, so it stays usable
//! until it expires or is replaced.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::AccountError;
use crate::models::user::{User, UserPatch};
use crate::repositories::UserStore;
use crate::types::UserId;

/// How a caller identifies the account whose code is checked.
#[derive(Debug, Clone, Copy)]
pub enum UserRef<'a> {
    Id(UserId),
    Email(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    pub code_id: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedCode {
    /// Writes the code onto a user that has not been persisted yet.
    pub fn attach(&self, user: &mut User) {
        user.code_id = Some(self.code_id.clone());
        user.code_expired = Some(self.expires_at);
    }

    fn patch(&self) -> UserPatch {
        UserPatch {
            code_id: Some(self.code_id.clone()),
            code_expired: Some(self.expires_at),
            ..UserPatch::default()
        }
    }
}

/// Checks `submitted` against the user's stored code at instant `now`.
///
/// Mismatch wins over expiry. A missing code is a mismatch, a missing expiry
/// is expired, and the expiry instant itself is already expired.
pub fn check_code(user: &User, submitted: &str, now: DateTime<Utc>) -> Result<(), AccountError> {
    match user.code_id.as_deref() {
        Some(stored) if stored == submitted => {}
        _ => return Err(AccountError::CodeMismatch),
    }
    match user.code_expired {
        Some(expiry) if now < expiry => Ok(()),
        _ => Err(AccountError::CodeExpired),
    }
}

#[derive(Clone)]
pub struct CodeManager {
    store: Arc<dyn UserStore>,
    ttl: Duration,
}

impl CodeManager {
    pub fn new(store: Arc<dyn UserStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Fresh random code expiring `ttl` after `now`. Nothing is persisted.
    pub fn generate(&self, now: DateTime<Utc>) -> IssuedCode {
        IssuedCode {
            code_id: Uuid::new_v4().to_string(),
            expires_at: now + self.ttl,
        }
    }

    /// Replaces the user's code with a fresh one and persists it.
    pub async fn issue_code(&self, user: &User) -> Result<IssuedCode, AccountError> {
        let issued = self.generate(Utc::now());
        self.store
            .update_fields(user.id, &issued.patch())
            .await?
            .ok_or(AccountError::NotFound("User"))?;

        tracing::debug!(user_id = %user.id, expires_at = %issued.expires_at, "code issued");
        Ok(issued)
    }

    /// Loads the user and checks the submitted code, returning the user on success.
    pub async fn validate_code(
        &self,
        user_ref: UserRef<'_>,
        submitted: &str,
    ) -> Result<User, AccountError> {
        let user = match user_ref {
            UserRef::Id(id) => self.store.find_by_id(id).await?,
            UserRef::Email(email) => self.store.find_by_email(email).await?,
        }
        .ok_or(AccountError::NotFound("User"))?;

        check_code(&user, submitted, Utc::now())?;
        Ok(user)
    }

    pub async fn consume_for_activation(&self, user: &User) -> Result<User, AccountError> {
        let patch = UserPatch {
            is_active: Some(true),
            ..UserPatch::default()
        };
        self.store
            .update_fields(user.id, &patch)
            .await?
            .ok_or(AccountError::NotFound("User"))
    }

    pub async fn consume_for_password_reset(
        &self,
        user: &User,
        new_hash: String,
    ) -> Result<User, AccountError> {
        let patch = UserPatch {
            password_hash: Some(new_hash),
            ..UserPatch::default()
        };
        self.store
            .update_fields(user.id, &patch)
            .await?
            .ok_or(AccountError::NotFound("User"))
    }
}
