//! Models that represent user accounts, profile payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use validator::Validate;

use crate::types::UserId;
use crate::validation::rules;

#[derive(Debug, Clone, FromRow)]
/// Database representation of a user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,
    /// Display name; registration allows it to be omitted.
    pub name: Option<String>,
    /// Login email, unique across all accounts.
    pub email: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    /// Role describing the user's privileges.
    pub role: UserRole,
    /// How the account was created.
    pub account_type: AccountType,
    /// Flipped to `true` once an activation code is consumed.
    pub is_active: bool,
    /// Current one-time code. Overwritten on every issuance.
    pub code_id: Option<String>,
    /// Instant at which `code_id` stops being accepted.
    pub code_expired: Option<DateTime<Utc>>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
pub enum UserRole {
    /// Regular account holder.
    #[default]
    User,
    /// Administrator role with elevated permissions.
    Admin,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "user" | "User" | "USER" => Ok(UserRole::User),
            "admin" | "Admin" | "ADMIN" => Ok(UserRole::Admin),
            other => Err(serde::de::Error::unknown_variant(other, &["user", "admin"])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Origin of the account credentials.
pub enum AccountType {
    /// Email + password registered through this service.
    #[default]
    Local,
    Google,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Local => "local",
            AccountType::Google => "google",
        }
    }
}

impl Serialize for AccountType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccountType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "local" | "Local" | "LOCAL" => Ok(AccountType::Local),
            "google" | "Google" | "GOOGLE" => Ok(AccountType::Google),
            other => Err(serde::de::Error::unknown_variant(other, &["local", "google"])),
        }
    }
}

impl User {
    /// Constructs an inactive local account with a freshly generated id.
    pub fn new(email: String, password_hash: String, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            phone: None,
            address: None,
            image: None,
            role: UserRole::default(),
            account_type: AccountType::default(),
            is_active: false,
            code_id: None,
            code_expired: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Name used to greet the user in notifications.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Partial update applied by [`crate::repositories::UserStore::update_fields`].
/// `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub code_id: Option<String>,
    pub code_expired: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == UserPatch::default()
    }
}

/// Filters accepted by the user listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub email: Option<String>,
    /// Case-insensitive substring match.
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(email) = &self.email {
            if &user.email != email {
                return false;
            }
        }
        if let Some(needle) = &self.name {
            let needle = needle.to_lowercase();
            let found = user
                .name
                .as_deref()
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !found {
                return false;
            }
        }
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }
        if let Some(is_active) = self.is_active {
            if user.is_active != is_active {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Payload for creating a user record directly.
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(custom(function = "rules::validate_password"))]
    pub password: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Payload for updating portions of an existing user.
pub struct UpdateUserRequest {
    #[validate(custom(function = "rules::validate_user_id"))]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Query string of `GET /users`.
pub struct UserListQuery {
    pub page_number: Option<i64>,
    pub page_size: Option<i64>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UserListQuery {
    pub fn filter(&self) -> UserFilter {
        UserFilter {
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct IdResponse {
    pub id: UserId,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Public-facing representation of a user. Never carries the password hash
/// or the current code.
pub struct UserResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
    pub role: UserRole,
    pub account_type: AccountType,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            image: user.image,
            role: user.role,
            account_type: user.account_type,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
