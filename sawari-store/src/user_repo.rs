use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sawari_core::{NewUser, OperatorKey, RepositoryError, User, UserRepository, UserRole};

use crate::{corrupt, map_unique};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let role = UserRole::parse(&self.role).ok_or_else(|| corrupt("user role", &self.role))?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            phone: self.phone,
            role,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OperatorKeyRow {
    id: Uuid,
    key: String,
    created_by: Uuid,
    used_by: Option<Uuid>,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<OperatorKeyRow> for OperatorKey {
    fn from(row: OperatorKeyRow) -> Self {
        OperatorKey {
            id: row.id,
            key: row.key,
            created_by: row.created_by,
            used_by: row.used_by,
            used_at: row.used_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(
            "
            INSERT INTO users (id, name, email, password_hash, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
            ",
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_unique(err, "email already registered"))?;

        row.into_user()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1;")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        row.map(UserRow::into_user).transpose()
    }

    async fn count_users(&self) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users;")
            .fetch_one(&self.pool)
            .await
            .map_err(RepositoryError::storage)?;

        Ok(count.0)
    }

    async fn create_operator_key(
        &self,
        key: &str,
        created_by: Uuid,
    ) -> Result<OperatorKey, RepositoryError> {
        let row: OperatorKeyRow = sqlx::query_as(
            "
            INSERT INTO operator_keys (id, key, created_by, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *;
            ",
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_unique(err, "operator key already exists"))?;

        Ok(row.into())
    }

    async fn find_operator_key(&self, key: &str) -> Result<Option<OperatorKey>, RepositoryError> {
        let row: Option<OperatorKeyRow> =
            sqlx::query_as("SELECT * FROM operator_keys WHERE key = $1;")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(RepositoryError::storage)?;

        Ok(row.map(Into::into))
    }

    async fn mark_operator_key_used(
        &self,
        key_id: Uuid,
        used_by: Uuid,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "
            UPDATE operator_keys
            SET used_by = $1, used_at = $2
            WHERE id = $3 AND used_at IS NULL;
            ",
        )
        .bind(used_by)
        .bind(Utc::now())
        .bind(key_id)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::storage)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "operator key already used".to_string(),
            ));
        }
        Ok(())
    }
}
