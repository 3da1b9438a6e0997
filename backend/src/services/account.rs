//! Registration, activation, password reset and token issuance.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::error::AccountError;
use crate::models::auth::{
    AccessTokenResponse, ActivationResponse, CheckCodeRequest, CreateNewPasswordRequest,
    LoginRequest, RefreshTokenRequest, RegisterRequest, RetryPasswordResponse, TokenPair,
};
use crate::models::user::{IdResponse, User};
use crate::repositories::UserStore;
use crate::services::code::{CodeManager, UserRef};
use crate::types::UserId;
use crate::utils::email::{dispatch, MailMessage, Mailer};
use crate::utils::jwt::{TokenIssuer, TokenSubject};
use crate::utils::password::{hash_password_async, verify_password_async};

/// Password shared by every account created through [`AccountService::fact_register`].
pub const FACT_PASSWORD: &str = "123456";

const FACT_FIRST_NAMES: &[&str] = &[
    "Alex", "Bao", "Chi", "Dana", "Elif", "Hana", "Ivan", "Jun", "Kai", "Linh", "Mai", "Noah",
    "Omar", "Quynh", "Sam", "Tuan",
];
const FACT_LAST_NAMES: &[&str] = &[
    "Nguyen", "Tran", "Le", "Pham", "Smith", "Garcia", "Kim", "Sato", "Novak", "Silva",
];

pub struct AccountService {
    store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
    codes: CodeManager,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        tokens: TokenIssuer,
        code_ttl: Duration,
    ) -> Self {
        let codes = CodeManager::new(store.clone(), code_ttl);
        Self {
            store,
            mailer,
            tokens,
            codes,
        }
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<TokenPair, AccountError> {
        let user = self
            .store
            .find_by_email(&payload.email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_password_async(payload.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AccountError::NotActivated);
        }

        let pair = self
            .tokens
            .issue_pair(&TokenSubject::new(user.id, &user.email))?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(pair)
    }

    pub fn refresh(&self, payload: RefreshTokenRequest) -> Result<AccessTokenResponse, AccountError> {
        let access_token = self.tokens.refresh(&payload.refresh_token)?;
        Ok(AccessTokenResponse { access_token })
    }

    pub async fn register(&self, payload: RegisterRequest) -> Result<IdResponse, AccountError> {
        let RegisterRequest {
            email,
            password,
            name,
        } = payload;

        if self.store.email_exists(&email).await? {
            return Err(AccountError::DuplicateEmail(email));
        }

        let password_hash = hash_password_async(password).await?;
        let mut user = User::new(email, password_hash, name);
        let issued = self.codes.generate(Utc::now());
        issued.attach(&mut user);

        // The unique index still rejects a concurrent registration that passed the check above.
        let user = self.store.create(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        dispatch(
            self.mailer.clone(),
            MailMessage::activation(&user.email, user.display_name(), &issued.code_id),
        );
        Ok(IdResponse { id: user.id })
    }

    /// Creates `count` inactive accounts that share one password hash and one code.
    pub async fn fact_register(&self, count: u32) -> Result<u64, AccountError> {
        let password_hash = hash_password_async(FACT_PASSWORD.to_string()).await?;
        let issued = self.codes.generate(Utc::now());

        let users: Vec<User> = {
            let mut rng = rand::thread_rng();
            (0..count)
                .map(|_| {
                    let first = FACT_FIRST_NAMES.choose(&mut rng).copied().unwrap_or("User");
                    let last = FACT_LAST_NAMES.choose(&mut rng).copied().unwrap_or("Fact");
                    let mut user = User::new(
                        format!("{}@example.com", Uuid::new_v4()),
                        password_hash.clone(),
                        Some(format!("{} {}", first, last)),
                    );
                    issued.attach(&mut user);
                    user
                })
                .collect()
        };

        let inserted = self.store.create_many(&users).await?;
        tracing::info!(inserted, "synthetic accounts created");
        Ok(inserted)
    }

    pub async fn check_code(
        &self,
        payload: CheckCodeRequest,
    ) -> Result<ActivationResponse, AccountError> {
        let id: UserId = payload
            .id
            .parse()
            .map_err(|_| AccountError::Validation("id must be a valid UUID".into()))?;

        let user = self.codes.validate_code(UserRef::Id(id), &payload.code).await?;
        let user = self.codes.consume_for_activation(&user).await?;
        tracing::info!(user_id = %user.id, "account activated");
        Ok(ActivationResponse {
            is_active: user.is_active,
        })
    }

    pub async fn retry_active(&self, email: &str) -> Result<IdResponse, AccountError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound("User"))?;
        if user.is_active {
            return Err(AccountError::AlreadyActive);
        }

        let issued = self.codes.issue_code(&user).await?;
        dispatch(
            self.mailer.clone(),
            MailMessage::activation(&user.email, user.display_name(), &issued.code_id),
        );
        Ok(IdResponse { id: user.id })
    }

    pub async fn retry_password(&self, email: &str) -> Result<RetryPasswordResponse, AccountError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound("User"))?;

        let issued = self.codes.issue_code(&user).await?;
        dispatch(
            self.mailer.clone(),
            MailMessage::password_reset(&user.email, user.display_name(), &issued.code_id),
        );
        Ok(RetryPasswordResponse {
            id: user.id,
            email: user.email,
        })
    }

    pub async fn create_new_password(
        &self,
        payload: CreateNewPasswordRequest,
    ) -> Result<(), AccountError> {
        if payload.password != payload.confirm_password {
            return Err(AccountError::Validation(
                "password and confirmPassword do not match".into(),
            ));
        }

        let user = self
            .codes
            .validate_code(UserRef::Email(&payload.email), &payload.code)
            .await?;
        let password_hash = hash_password_async(payload.password).await?;
        self.codes
            .consume_for_password_reset(&user, password_hash)
            .await?;
        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}
