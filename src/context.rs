//! Request-scoped propagation of verified identity.
//!
//! Verified claims and the raw token travel with the request as a single
//! typed extension value. Readers get an explicit error when nothing was
//! attached; a second attachment overwrites the first (only the gate attaches
//! in practice).

use http::Extensions;

use crate::error::AuthError;
use crate::jwt::Claims;

/// Verified identity attached to a request by the authentication gate.
///
/// Immutable once attached; dropped with the request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: Claims,
    token: String,
}

impl AuthContext {
    /// Attaches verified claims and the raw token to the request. Last write
    /// wins.
    pub fn attach(extensions: &mut Extensions, claims: Claims, token: impl Into<String>) {
        extensions.insert(Self {
            claims,
            token: token.into(),
        });
    }

    /// Reads the verified claims attached to the request.
    pub fn claims(extensions: &Extensions) -> Result<&Claims, AuthError> {
        extensions
            .get::<Self>()
            .map(|ctx| &ctx.claims)
            .ok_or(AuthError::NoClaimsInRequest)
    }

    /// Reads the raw token string attached to the request.
    pub fn token(extensions: &Extensions) -> Result<&str, AuthError> {
        extensions
            .get::<Self>()
            .map(|ctx| ctx.token.as_str())
            .ok_or(AuthError::NoTokenInRequest)
    }
}
