use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

use super::claims::{AuthenticatedUser, Claims};

/// Fixed lifetime of an issued token. There is no renewal.
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Why a token was rejected. Callers only ever see "unauthorized"; the
/// variants exist for logs.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unexpected signing algorithm")]
    Algorithm,
    #[error("invalid signature")]
    Signature,
    #[error("token expired")]
    Expired,
    #[error("invalid token claims")]
    BadClaim,
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::Signature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::Algorithm,
            ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => Self::BadClaim,
            _ => Self::Malformed,
        }
    }
}

/// HS256 signing and verification keys derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    /// Issues a token as if it were `now`; `issue` is this with the wall clock.
    pub fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> Result<String, TokenError> {
        let exp = now + TOKEN_TTL;
        let claims = Claims {
            id: user_id,
            exp: exp.unix_timestamp().max(0) as u64,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)?;
        debug!(user_id, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        // Pinning the algorithm rejects `none` and asymmetric-key confusion.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        if data.claims.id <= 0 {
            return Err(TokenError::BadClaim);
        }
        debug!(user_id = data.claims.id, "jwt verified");
        Ok(AuthenticatedUser { id: data.claims.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64ct::{Base64UrlUnpadded, Encoding};
    use time::Duration as TimeDuration;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
        })
    }

    fn forge(header: &str, payload: &str, secret: &str) -> String {
        let h = Base64UrlUnpadded::encode_string(header.as_bytes());
        let p = Base64UrlUnpadded::encode_string(payload.as_bytes());
        let message = format!("{h}.{p}");
        let sig = jsonwebtoken::crypto::sign(
            message.as_bytes(),
            &EncodingKey::from_secret(secret.as_bytes()),
            Algorithm::HS256,
        )
        .unwrap();
        format!("{message}.{sig}")
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(42).expect("sign");
        let user = keys.verify(&token).expect("verify");
        assert_eq!(user.id, 42);
    }

    #[test]
    fn claims_carry_id_and_24h_expiry() {
        let keys = make_keys("dev-secret");
        let now = OffsetDateTime::now_utc();
        let token = keys.issue_at(7, now).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let raw = Base64UrlUnpadded::decode_vec(payload).unwrap();
        let claims: Claims = serde_json::from_slice(&raw).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp as i64, now.unix_timestamp() + 24 * 60 * 60);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret");
        let issued =
            OffsetDateTime::now_utc() - TimeDuration::hours(24) - TimeDuration::seconds(5);
        let token = keys.issue_at(1, issued).unwrap();
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn verify_accepts_token_just_before_expiry() {
        let keys = make_keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(23);
        let token = keys.issue_at(1, issued).unwrap();
        assert_eq!(keys.verify(&token).unwrap().id, 1);
    }

    #[test]
    fn verify_rejects_other_secret() {
        let token = make_keys("secret-a").issue(1).unwrap();
        let err = make_keys("secret-b").verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Signature));
    }

    #[test]
    fn flipping_any_character_invalidates_token() {
        let keys = make_keys("dev-secret");
        let token = keys.issue(99).unwrap();
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(keys.verify(&tampered).is_err(), "tampered index {i} accepted");
        }
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret");
        assert!(keys.verify("").is_err());
        assert!(keys.verify("not.a.token").is_err());
    }

    #[test]
    fn verify_rejects_none_algorithm() {
        let keys = make_keys("dev-secret");
        let exp = OffsetDateTime::now_utc().unix_timestamp() + 3600;
        let h = Base64UrlUnpadded::encode_string(br#"{"alg":"none","typ":"JWT"}"#);
        let p = Base64UrlUnpadded::encode_string(format!(r#"{{"id":1,"exp":{exp}}}"#).as_bytes());
        let token = format!("{h}.{p}.");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_missing_or_non_numeric_id() {
        let keys = make_keys("dev-secret");
        let exp = OffsetDateTime::now_utc().unix_timestamp() + 3600;
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;

        let missing = forge(header, &format!(r#"{{"exp":{exp}}}"#), "dev-secret");
        assert!(matches!(keys.verify(&missing), Err(TokenError::BadClaim)));

        let textual = forge(header, &format!(r#"{{"id":"1","exp":{exp}}}"#), "dev-secret");
        assert!(matches!(keys.verify(&textual), Err(TokenError::BadClaim)));

        let zero = forge(header, &format!(r#"{{"id":0,"exp":{exp}}}"#), "dev-secret");
        assert!(matches!(keys.verify(&zero), Err(TokenError::BadClaim)));
    }

    #[test]
    fn verify_rejects_token_without_expiry() {
        let keys = make_keys("dev-secret");
        let token = forge(r#"{"alg":"HS256","typ":"JWT"}"#, r#"{"id":1}"#, "dev-secret");
        assert!(keys.verify(&token).is_err());
    }
}
