//! PostgreSQL implementation of [`UserStore`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::StoreError;
use crate::models::pagination::PageRequest;
use crate::models::user::{User, UserFilter, UserPatch};
use crate::repositories::common::push_user_filter;
use crate::repositories::user_repository::UserStore;
use crate::types::UserId;

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, address, image, \
     LOWER(role) as role, LOWER(account_type) as account_type, is_active, code_id, \
     code_expired, created_at, updated_at";

/// Rows per INSERT statement in [`UserStore::create_many`]; keeps bind
/// parameters under the Postgres limit of 65535.
const INSERT_CHUNK_SIZE: usize = 1000;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique-index violation on `users.email` to [`StoreError::DuplicateEmail`].
fn map_insert_error(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Database(err),
    }
}

fn push_user_values(builder: &mut QueryBuilder<'_, Postgres>, users: &[User]) {
    builder.push(
        "INSERT INTO users (id, name, email, password_hash, phone, address, image, role, \
         account_type, is_active, code_id, code_expired, created_at, updated_at) ",
    );
    builder.push_values(users, |mut row, user| {
        row.push_bind(user.id)
            .push_bind(user.name.clone())
            .push_bind(user.email.clone())
            .push_bind(user.password_hash.clone())
            .push_bind(user.phone.clone())
            .push_bind(user.address.clone())
            .push_bind(user.image.clone())
            .push_bind(user.role.as_str())
            .push_bind(user.account_type.as_str())
            .push_bind(user.is_active)
            .push_bind(user.code_id.clone())
            .push_bind(user.code_expired)
            .push_bind(user.created_at)
            .push_bind(user.updated_at);
    });
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create(&self, user: &User) -> Result<User, StoreError> {
        let mut builder = QueryBuilder::new("");
        push_user_values(&mut builder, std::slice::from_ref(user));
        builder.push(" RETURNING ").push(USER_COLUMNS);

        builder
            .build_query_as::<User>()
            .fetch_one(&self.pool)
            .await
            .map_err(|err| map_insert_error(err, &user.email))
    }

    async fn create_many(&self, users: &[User]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in users.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = QueryBuilder::new("");
            push_user_values(&mut builder, chunk);
            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|err| map_insert_error(err, "batch"))?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn update_fields(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                address = COALESCE($4, address),
                image = COALESCE($5, image),
                password_hash = COALESCE($6, password_hash),
                is_active = COALESCE($7, is_active),
                code_id = COALESCE($8, code_id),
                code_expired = COALESCE($9, code_expired),
                updated_at = $10
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.phone)
        .bind(&patch.address)
        .bind(&patch.image)
        .bind(&patch.password_hash)
        .bind(patch.is_active)
        .bind(&patch.code_id)
        .bind(patch.code_expired)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn paginated_list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let mut count_builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_user_filter(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        builder.push(USER_COLUMNS).push(" FROM users");
        push_user_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.page_size)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let users = builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }
}
