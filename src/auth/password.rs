//! Argon2id password hashing. Digests are PHC strings carrying their own salt
//! and cost parameters, so verification needs nothing but the stored string.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tokio::sync::OnceCell;
use tracing::error;

/// Digest verified against when a login names no account, so that path does
/// the same Argon2 work as a wrong password.
pub(crate) static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!("password hashing failed: {e}")
        })?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!("stored password hash is malformed: {e}")
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Runs [`hash_password`] on the blocking pool. The hash is computed to
/// completion even if the caller stops waiting.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain)).await?
}

pub async fn verify_password_blocking(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &hash)).await?
}

/// Verifies `plain` against [`DUMMY_HASH`] and discards the outcome.
pub async fn verify_dummy_blocking(plain: String) {
    let hash = match DUMMY_HASH
        .get_or_try_init(|| hash_password_blocking("dummy-password".into()))
        .await
    {
        Ok(hash) => hash.clone(),
        Err(e) => {
            error!(error = ?e, "dummy digest unavailable");
            return;
        }
    };
    let _ = verify_password_blocking(plain, hash).await;
}
