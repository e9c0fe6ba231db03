//! Token creation and verification.
//!
//! Tokens are signed with a single fixed asymmetric algorithm (RS512). No
//! algorithm negotiation is accepted at verification time: a token whose
//! header names any other algorithm is rejected outright.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::error::AuthError;
use crate::jwt::claims::Claims;

/// The one signing algorithm this crate accepts.
pub const ALGORITHM: Algorithm = Algorithm::RS512;

/// Exact, case-sensitive prefix required on Authorization headers.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Signs `claims` into a token string with the issuer's private key.
///
/// Fails with [`AuthError::InvalidClaims`] when the claims are structurally
/// invalid and [`AuthError::NoKey`] when no key is supplied.
pub fn create_token(claims: &Claims, key: Option<&EncodingKey>) -> Result<String, AuthError> {
    claims.validate()?;

    let key = key.ok_or(AuthError::NoKey)?;

    encode(&Header::new(ALGORITHM), claims, key).map_err(|source| AuthError::Signing { source })
}

/// Verifies a token string against the resolved public key and returns its
/// claims.
///
/// Fails with [`AuthError::NoToken`] on empty input, [`AuthError::NoKey`] when
/// no key is supplied and [`AuthError::InvalidToken`] when the signature does
/// not verify, the algorithm is not RS512, or the validity window is violated.
pub fn parse_token(token: &str, key: Option<&DecodingKey>) -> Result<Claims, AuthError> {
    if token.is_empty() {
        return Err(AuthError::NoToken);
    }

    let key = key.ok_or(AuthError::NoKey)?;

    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, key, &validation)
        .map_err(|source| AuthError::InvalidToken { source })?;

    // jsonwebtoken covers exp and nbf; iat ordering is ours to enforce.
    data.claims.check_window(Utc::now().timestamp())?;

    Ok(data.claims)
}

/// Verifies the token carried in an `Authorization: Bearer <token>` header
/// value.
///
/// An empty header fails with [`AuthError::AccessTokenRequired`]; a header
/// without the exact [`BEARER_PREFIX`] fails with
/// [`AuthError::BearerRequired`] before any parsing is attempted; a
/// verification failure is wrapped in
/// [`AuthError::AuthorizationTokenInvalid`] with the underlying failure kept
/// as the logged cause.
pub fn claims_from_bearer(header: &str, key: Option<&DecodingKey>) -> Result<Claims, AuthError> {
    if header.is_empty() {
        return Err(AuthError::AccessTokenRequired);
    }

    let Some(token) = header.strip_prefix(BEARER_PREFIX) else {
        return Err(AuthError::BearerRequired);
    };

    parse_token(token, key).map_err(|source| AuthError::AuthorizationTokenInvalid {
        source: Box::new(source),
    })
}
