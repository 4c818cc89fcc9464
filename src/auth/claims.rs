use serde::{Deserialize, Serialize};

/// JWT payload issued on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,  // user ID
    pub exp: u64, // expires at (unix timestamp)
}

/// Identity proven by a verified bearer token. Only the authorization gate
/// constructs it; handlers that need the caller take it as a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
}
