// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};

/// Claims the CodeForge backend puts into its access tokens.
///
/// The client never holds the signing secret, so these are read without
/// signature verification and only used to skip sending expired tokens.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user id.
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time as Unix timestamp.
    #[serde(default)]
    pub exp: Option<u64>,
}

/// Reads the claims of a JWT without verifying it.
///
/// Returns `None` for opaque (non-JWT) tokens.
pub fn peek_claims(token: &str) -> Option<Claims> {
    let header = decode_header(token).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .map(|data| data.claims)
}

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// True when the token is a JWT whose `exp` lies at or before `now`.
/// Opaque tokens and JWTs without `exp` never count as expired.
pub fn is_expired(token: &str, now: u64) -> bool {
    matches!(peek_claims(token), Some(Claims { exp: Some(exp), .. }) if exp <= now)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) fn make_token(exp: u64) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let claims = Claims {
        sub: Some("user-1".to_string()),
        exp: Some(exp),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("encode test token")
}
