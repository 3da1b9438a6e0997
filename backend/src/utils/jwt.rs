use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Config, error::AccountError, models::auth::TokenPair, types::UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: i64,    // expiration time
    pub iat: i64,    // issued at
    pub jti: String, // JWT ID
}

impl Claims {
    pub fn new(subject: &TokenSubject, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = now + ttl;

        Self {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.sub.clone(),
            email: self.email.clone(),
        }
    }
}

/// The `{email, sub}` pair carried by both token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
}

impl TokenSubject {
    pub fn new(user_id: UserId, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.into(),
        }
    }
}

/// Issues and verifies stateless HS256 tokens.
///
/// Refresh tokens are signed with `refresh_secret` but verified with the
/// access secret, so refresh only works while both secrets are equal.
#[derive(Clone)]
pub struct TokenIssuer {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.clone(),
            config.refresh_token_secret.clone(),
            config.access_token_ttl(),
            config.refresh_token_ttl(),
        )
    }

    pub fn issue_access_token(&self, subject: &TokenSubject) -> anyhow::Result<String> {
        sign(&Claims::new(subject, self.access_ttl), &self.access_secret)
    }

    pub fn issue_refresh_token(&self, subject: &TokenSubject) -> anyhow::Result<String> {
        sign(&Claims::new(subject, self.refresh_ttl), &self.refresh_secret)
    }

    pub fn issue_pair(&self, subject: &TokenSubject) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject)?,
            refresh_token: self.issue_refresh_token(subject)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AccountError> {
        verify(token, &self.access_secret).map_err(|_| AccountError::InvalidToken)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AccountError> {
        verify(token, &self.access_secret).map_err(|_| AccountError::InvalidToken)
    }

    /// Verifies the refresh token and issues a new access token for the same
    /// subject. The refresh token itself is not rotated.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AccountError> {
        let claims = self.verify_refresh_token(refresh_token)?;
        let access_token = self.issue_access_token(&claims.subject())?;
        Ok(access_token)
    }
}

fn sign(claims: &Claims, secret: &str) -> anyhow::Result<String> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

fn verify(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}
