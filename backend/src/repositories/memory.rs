//! In-process [`UserStore`] used by tests and local tooling.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::models::pagination::PageRequest;
use crate::models::user::{User, UserFilter, UserPatch};
use crate::repositories::user_repository::UserStore;
use crate::types::UserId;

/// Users kept in insertion order behind a single lock, so the uniqueness
/// check and the insert happen atomically.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<Vec<User>>>,
}

impl fmt::Debug for InMemoryUserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InMemoryUserStore");
        match self.users.try_lock() {
            Ok(users) => debug.field("users", &users.len()),
            Err(_) => debug.field("users", &"<locked>"),
        };
        debug.finish()
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(name) = &patch.name {
        user.name = Some(name.clone());
    }
    if let Some(phone) = &patch.phone {
        user.phone = Some(phone.clone());
    }
    if let Some(address) = &patch.address {
        user.address = Some(address.clone());
    }
    if let Some(image) = &patch.image {
        user.image = Some(image.clone());
    }
    if let Some(password_hash) = &patch.password_hash {
        user.password_hash = password_hash.clone();
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = is_active;
    }
    if let Some(code_id) = &patch.code_id {
        user.code_id = Some(code_id.clone());
    }
    if let Some(code_expired) = patch.code_expired {
        user.code_expired = Some(code_expired);
    }
    user.updated_at = Utc::now();
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let users = self.users.lock().await;
        Ok(users.iter().any(|u| u.email == email))
    }

    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email.clone()));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn create_many(&self, batch: &[User]) -> Result<u64, StoreError> {
        let mut users = self.users.lock().await;
        for (idx, candidate) in batch.iter().enumerate() {
            let taken = users.iter().any(|u| u.email == candidate.email)
                || batch[..idx].iter().any(|u| u.email == candidate.email);
            if taken {
                return Err(StoreError::DuplicateEmail(candidate.email.clone()));
            }
        }
        users.extend(batch.iter().cloned());
        Ok(batch.len() as u64)
    }

    async fn update_fields(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            apply_patch(user, patch);
            user.clone()
        }))
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let mut users = self.users.lock().await;
        let position = users.iter().position(|u| u.id == id);
        Ok(position.map(|idx| users.remove(idx)))
    }

    async fn paginated_list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let users = self.users.lock().await;
        let mut matching: Vec<&User> = users.iter().filter(|u| filter.matches(u)).collect();
        // Newest first; insertion order breaks ties.
        matching.reverse();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.page_size).unwrap_or(0))
            .cloned()
            .collect();
        Ok((items, total))
    }
}
