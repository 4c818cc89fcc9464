use async_trait::async_trait;
use thiserror::Error;

use super::repo_types::{NewUser, User, UserUpdate};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user not found")]
    NotFound,
    /// Anything else the store reports; never inspected by callers.
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence port consumed by the identity service.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a user; the store assigns `id` and `created_at`.
    async fn create(&self, new_user: NewUser) -> RepoResult<User>;

    async fn get_by_id(&self, id: i64) -> RepoResult<User>;

    async fn get_by_email(&self, email: &str) -> RepoResult<User>;

    async fn get_all(&self) -> RepoResult<Vec<User>>;

    /// Replaces name, email and hash. `id` and `created_at` never change.
    async fn update(&self, update: UserUpdate) -> RepoResult<User>;

    async fn delete(&self, id: i64) -> RepoResult<()>;
}
