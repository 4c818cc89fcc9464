use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::users::{repo_types::UserInput, services::UserService};

const DEMO_USERS: [(&str, &str, &str); 5] = [
    ("Alice", "alice@example.com", "pass123"),
    ("Bob", "bob@example.com", "pass456"),
    ("Charlie", "charlie@example.com", "pass789"),
    ("Dave", "dave@example.com", "pass101"),
    ("Eve", "eve@example.com", "pass202"),
];

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url())
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &PgPool) {
    match sqlx::migrate!("./migrations").run(db).await {
        Ok(()) => info!("migrations applied"),
        Err(e) => warn!(error = %e, "migration failed; continuing"),
    }
}

/// Tops the store up to the five demo users. Goes through the service so the
/// accounts are validated and hashed like any other.
pub async fn seed_demo_users(users: &UserService) -> anyhow::Result<usize> {
    let count = users
        .get_all()
        .await
        .context("count users before seeding")?
        .len();
    if count >= DEMO_USERS.len() {
        info!(count, "seeder skipped: enough users already exist");
        return Ok(0);
    }

    for (name, email, password) in &DEMO_USERS[count..] {
        users
            .create(UserInput {
                name: (*name).into(),
                email: (*email).into(),
                password: (*password).into(),
            })
            .await
            .with_context(|| format!("seed user {name}"))?;
    }

    let added = DEMO_USERS.len() - count;
    info!(added, "seeder completed");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{auth::jwt::JwtKeys, config::JwtConfig, users::memory::InMemoryUserRepository};

    fn service() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            JwtKeys::new(&JwtConfig {
                secret: "seed".into(),
            }),
        )
    }

    #[tokio::test]
    async fn seeds_into_empty_store_once() {
        let users = service();
        assert_eq!(seed_demo_users(&users).await.unwrap(), 5);
        assert_eq!(seed_demo_users(&users).await.unwrap(), 0);
        assert!(users.login("eve@example.com", "pass202").await.is_ok());
    }

    #[tokio::test]
    async fn tops_up_partial_store() {
        let users = service();
        users
            .create(UserInput {
                name: "Someone".into(),
                email: "someone@example.com".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        assert_eq!(seed_demo_users(&users).await.unwrap(), 4);
        let all = users.get_all().await.unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|u| u.email != "alice@example.com"));
    }
}
