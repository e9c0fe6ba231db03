//! Identity claims carried by signed tokens.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// What a token is for.
///
/// Only access tokens grant access to protected routes; refresh tokens exist
/// solely to mint new access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token granting access to the application.
    Access,
    /// Long-lived token used to obtain access tokens.
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// Identity and policy facts carried by a verified token.
///
/// Timestamps are unix seconds. At verification time the validity window must
/// satisfy `iat <= nbf <= now <= exp` (`nbf` falls back to `iat` when absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Issued-at.
    pub iat: i64,
    /// Expires-at.
    pub exp: i64,
    /// Not-before, optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Token type.
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Subject identifier.
    pub user_id: u64,
    /// Username of the subject.
    pub username: String,
}

impl Claims {
    /// Builds claims issued now with the given time-to-live.
    pub fn new(
        user_id: u64,
        username: impl Into<String>,
        token_type: TokenType,
        issuer: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iss: issuer.into(),
            iat: now,
            exp: now + ttl.num_seconds(),
            nbf: None,
            token_type,
            user_id,
            username: username.into(),
        }
    }

    /// Subject identifier of the authorized user.
    pub fn authorized_user_id(&self) -> u64 {
        self.user_id
    }

    /// Structural validation applied before signing.
    ///
    /// Checks the shape of the validity window, not its relation to the
    /// current time; creating an already-expired token is legal (and used to
    /// exercise verification failures).
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.iss.is_empty() {
            return Err(AuthError::InvalidClaims {
                reason: "issuer is required".to_string(),
            });
        }

        if self.exp <= self.iat {
            return Err(AuthError::InvalidClaims {
                reason: "expiry must be after issued-at".to_string(),
            });
        }

        if let Some(nbf) = self.nbf {
            if nbf < self.iat || nbf > self.exp {
                return Err(AuthError::InvalidClaims {
                    reason: "not-before must fall within the validity window".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Temporal invariant checked at verification time.
    pub(crate) fn check_window(&self, now: i64) -> Result<(), AuthError> {
        use jsonwebtoken::errors::ErrorKind;

        let nbf = self.nbf.unwrap_or(self.iat);
        if self.iat > nbf || nbf > now {
            return Err(AuthError::InvalidToken {
                source: ErrorKind::ImmatureSignature.into(),
            });
        }

        if now > self.exp {
            return Err(AuthError::InvalidToken {
                source: ErrorKind::ExpiredSignature.into(),
            });
        }

        Ok(())
    }
}
