use async_trait::async_trait;
use uuid::Uuid;

use crate::identity::{NewUser, OperatorKey, User};

/// Errors surfaced by the persistence layer, shared by every repository
/// trait in the workspace.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RepositoryError::Storage(Box::new(err))
    }
}

/// Repository trait for account and operator-key access.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn count_users(&self) -> Result<i64, RepositoryError>;

    async fn create_operator_key(
        &self,
        key: &str,
        created_by: Uuid,
    ) -> Result<OperatorKey, RepositoryError>;

    async fn find_operator_key(&self, key: &str) -> Result<Option<OperatorKey>, RepositoryError>;

    async fn mark_operator_key_used(
        &self,
        key_id: Uuid,
        used_by: Uuid,
    ) -> Result<(), RepositoryError>;
}
