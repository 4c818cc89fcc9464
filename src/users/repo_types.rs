use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
///
/// Deliberately not `Serialize`: responses go through `UserResponse`, which
/// has no field for the hash.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,                    // assigned by the store
    pub name: String,
    pub email: String,              // login key, unique in the store
    pub password_hash: String,      // Argon2 PHC string
    pub created_at: OffsetDateTime, // assigned by the store
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Full replacement of the mutable columns of an existing user.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Plaintext input accepted by create and update.
#[derive(Debug, Clone, Default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}
