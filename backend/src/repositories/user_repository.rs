//! User store trait for dependency injection and testing.
//!
//! Services hold an `Arc<dyn UserStore>`; production wires
//! [`crate::repositories::PgUserStore`], tests use
//! [`crate::repositories::InMemoryUserStore`] or `MockUserStore`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::pagination::PageRequest;
use crate::models::user::{User, UserFilter, UserPatch};
use crate::types::UserId;

/// Persistence port for user records.
///
/// Implementations must enforce email uniqueness themselves: `create` and
/// `create_many` fail with [`StoreError::DuplicateEmail`] when the email is
/// taken, even if the caller checked [`UserStore::email_exists`] first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    async fn create(&self, user: &User) -> Result<User, StoreError>;

    /// Inserts all users atomically, returning how many rows were written.
    async fn create_many(&self, users: &[User]) -> Result<u64, StoreError>;

    /// Applies `patch` and returns the updated record, or `None` when no user has `id`.
    async fn update_fields(&self, id: UserId, patch: &UserPatch)
        -> Result<Option<User>, StoreError>;

    /// Removes the user, returning the deleted record if it existed.
    async fn delete(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Newest first, together with the total number of matching rows.
    async fn paginated_list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError>;
}
