use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::users::{memory::InMemoryUserRepository, repo::UserRepository, services::UserService};

/// Shared by the REST and RPC routers. Built once from the single config
/// value loaded at start-up.
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub keys: JwtKeys,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_parts(repo: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        let users = Arc::new(UserService::new(repo, keys.clone()));
        Self {
            users,
            keys,
            config,
        }
    }

    /// State over an empty in-memory store.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::from_parts(Arc::new(InMemoryUserRepository::new()), config)
    }
}
