//! CRUD over user records.

use std::sync::Arc;

use crate::error::AccountError;
use crate::models::pagination::{Page, PageRequest};
use crate::models::principal::Principal;
use crate::models::user::{
    CreateUserRequest, IdResponse, UpdateUserRequest, User, UserFilter, UserPatch, UserResponse,
};
use crate::repositories::UserStore;
use crate::types::UserId;
use crate::utils::password::hash_password_async;
use crate::validation::rules::validate_phone;

/// Result of a delete: the removed user, or nothing to remove.
#[derive(Debug)]
pub enum DeleteOutcome {
    Deleted(UserResponse),
    NotFound,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        principal: &Principal,
        payload: CreateUserRequest,
    ) -> Result<IdResponse, AccountError> {
        if let Some(phone) = payload.phone.as_deref() {
            check_phone(phone)?;
        }
        if self.store.email_exists(&payload.email).await? {
            return Err(AccountError::DuplicateEmail(payload.email));
        }

        let password_hash = hash_password_async(payload.password).await?;
        let mut user = User::new(payload.email, password_hash, payload.name);
        user.phone = payload.phone;
        user.address = payload.address;
        user.image = payload.image;

        let user = self.store.create(&user).await?;
        tracing::info!(user_id = %user.id, actor = %principal.user_id, "user created");
        Ok(IdResponse { id: user.id })
    }

    pub async fn list(
        &self,
        filter: &UserFilter,
        request: PageRequest,
    ) -> Result<Page<UserResponse>, AccountError> {
        let (users, total) = self.store.paginated_list(filter, request).await?;
        Ok(Page::new(users, request, total).map(UserResponse::from))
    }

    pub async fn find_by_id(&self, id: UserId) -> Result<UserResponse, AccountError> {
        self.store
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or(AccountError::NotFound("User"))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<UserResponse, AccountError> {
        self.store
            .find_by_email(email)
            .await?
            .map(UserResponse::from)
            .ok_or(AccountError::NotFound("User"))
    }

    pub async fn update(
        &self,
        principal: &Principal,
        payload: UpdateUserRequest,
    ) -> Result<UserResponse, AccountError> {
        let id = parse_id(&payload.id)?;
        if let Some(phone) = payload.phone.as_deref() {
            check_phone(phone)?;
        }

        let patch = UserPatch {
            name: payload.name,
            phone: payload.phone,
            address: payload.address,
            image: payload.image,
            ..UserPatch::default()
        };
        let user = self
            .store
            .update_fields(id, &patch)
            .await?
            .ok_or(AccountError::NotFound("User"))?;

        tracing::info!(user_id = %user.id, actor = %principal.user_id, "user updated");
        Ok(user.into())
    }

    pub async fn remove(
        &self,
        principal: &Principal,
        id: &str,
    ) -> Result<DeleteOutcome, AccountError> {
        let id = parse_id(id)?;
        match self.store.delete(id).await? {
            Some(user) => {
                tracing::info!(user_id = %user.id, actor = %principal.user_id, "user deleted");
                Ok(DeleteOutcome::Deleted(user.into()))
            }
            None => Ok(DeleteOutcome::NotFound),
        }
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<UserId, AccountError> {
    raw.parse()
        .map_err(|_| AccountError::Validation("id must be a valid UUID".into()))
}

fn check_phone(phone: &str) -> Result<(), AccountError> {
    validate_phone(phone)
        .map_err(|_| AccountError::Validation("phone must be a valid phone number".into()))
}
