use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{
    repo::{RepoError, RepoResult, UserRepository},
    repo_types::{NewUser, User, UserUpdate},
};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

/// In-process [`UserRepository`] with the same observable contract as the
/// Postgres one, including email uniqueness.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(inner: &Inner, email: &str, except: Option<i64>) -> bool {
    inner
        .users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

fn duplicate_email() -> RepoError {
    RepoError::Persistence(anyhow::anyhow!(
        "duplicate key value violates unique constraint \"users_email_key\""
    ))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> RepoResult<User> {
        let mut inner = self.inner.write().await;
        if email_taken(&inner, &new_user.email, None) {
            return Err(duplicate_email());
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> RepoResult<User> {
        let inner = self.inner.read().await;
        inner.users.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> RepoResult<User> {
        let inner = self.inner.read().await;
        inner
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn get_all(&self) -> RepoResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn update(&self, update: UserUpdate) -> RepoResult<User> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&update.id) {
            return Err(RepoError::NotFound);
        }
        if email_taken(&inner, &update.email, Some(update.id)) {
            return Err(duplicate_email());
        }
        let user = inner.users.get_mut(&update.id).ok_or(RepoError::NotFound)?;
        user.name = update.name;
        user.email = update.email;
        user.password_hash = update.password_hash;
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<()> {
        let mut inner = self.inner.write().await;
        inner.users.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}
