//! Access token inspection
//!
//! Reads the `exp` claim from JWT access tokens without verifying the
//! signature. Only informational: the server stays the authority on validity.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

fn parse_claims(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let header = decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/// Expiration time of a JWT access token
///
/// Returns `None` for opaque tokens or tokens without an `exp` claim.
pub fn expires_at(token: &str) -> Option<DateTime<Utc>> {
    let claims = parse_claims(token).ok()?;
    claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
}

/// Whether a JWT access token has expired; `None` when that cannot be told
pub fn is_expired(token: &str) -> Option<bool> {
    expires_at(token).map(|exp| exp <= Utc::now())
}
