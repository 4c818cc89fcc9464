use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use super::{
    repo::{RepoError, UserRepository},
    repo_types::{NewUser, User, UserInput, UserUpdate},
    validation::{validate_id, validate_login, validate_update, validate_user},
};
use crate::{
    auth::{
        claims::AuthenticatedUser,
        jwt::JwtKeys,
        password::{
            hash_password_blocking, verify_dummy_blocking, verify_password_blocking,
        },
    },
    error::{ServiceError, ServiceResult},
};

/// Single source of identity business rules, shared by the REST and RPC
/// adapters. Holds no mutable state; safe to share behind an `Arc`.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

/// `NotFound` for lookups by id, everything else is opaque.
fn by_id(id: i64) -> impl FnOnce(RepoError) -> ServiceError {
    move |err| match err {
        RepoError::NotFound => ServiceError::NotFound(id),
        RepoError::Persistence(e) => ServiceError::Internal(e),
    }
}

fn opaque(err: RepoError) -> ServiceError {
    match err {
        RepoError::NotFound => ServiceError::internal(anyhow::anyhow!("unexpected not found")),
        RepoError::Persistence(e) => ServiceError::Internal(e),
    }
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserInput) -> ServiceResult<User> {
        validate_user(&input)?;
        let password_hash = hash_password_blocking(input.password)
            .await
            .map_err(ServiceError::Internal)?;
        let user = self
            .repo
            .create(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(opaque)?;
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> ServiceResult<User> {
        validate_id(id)?;
        self.repo.get_by_id(id).await.map_err(by_id(id))
    }

    /// Returned records still carry their hashes; the adapters strip them.
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> ServiceResult<Vec<User>> {
        self.repo.get_all().await.map_err(opaque)
    }

    /// Replaces name and email and always re-hashes the supplied password.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, id: i64, input: UserInput) -> ServiceResult<User> {
        validate_update(id, &input)?;
        let password_hash = hash_password_blocking(input.password)
            .await
            .map_err(ServiceError::Internal)?;
        let user = self
            .repo
            .update(UserUpdate {
                id,
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(by_id(id))?;
        info!(user_id = user.id, "user updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        validate_id(id)?;
        self.repo.delete(id).await.map_err(by_id(id))?;
        info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Returns a signed token. Unknown email, lookup failure, unreadable
    /// stored digest and wrong password all produce the same
    /// `InvalidCredentials`, and each pays for one Argon2 verification.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<String> {
        validate_login(email, password)?;

        let user = match self.repo.get_by_email(email).await {
            Ok(user) => user,
            Err(err) => {
                match err {
                    RepoError::NotFound => warn!("login unknown email"),
                    RepoError::Persistence(e) => warn!(error = ?e, "login lookup failed"),
                }
                verify_dummy_blocking(password.to_owned()).await;
                return Err(ServiceError::InvalidCredentials);
            }
        };

        match verify_password_blocking(password.to_owned(), user.password_hash).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(user_id = user.id, "login invalid password");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => {
                error!(
                    user_id = user.id,
                    error = ?e,
                    "login could not verify stored digest"
                );
                return Err(ServiceError::InvalidCredentials);
            }
        }

        let token = self.keys.issue(user.id).map_err(ServiceError::internal)?;
        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    /// The record of the caller proven by the authorization gate.
    pub async fn current_user(&self, identity: AuthenticatedUser) -> ServiceResult<User> {
        self.get_by_id(identity.id).await
    }
}
