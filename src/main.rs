use std::sync::Arc;

use user_srv::{
    app::{build_app, build_rpc_app, serve},
    config::AppConfig,
    db,
    state::AppState,
    users::pg::PgUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_srv=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Loaded once; every component gets this same value.
    let config = Arc::new(AppConfig::from_env()?);

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await;

    let state = AppState::from_parts(Arc::new(PgUserRepository::new(pool)), config.clone());

    if config.seed_demo_users {
        db::seed_demo_users(&state.users).await?;
    }

    let rest = serve(build_app(state.clone()), config.http_addr()?, "rest");
    let rpc = serve(build_rpc_app(state), config.rpc_addr()?, "rpc");
    tokio::try_join!(rest, rpc)?;

    Ok(())
}
