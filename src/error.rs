//! Error taxonomy and status translation.
//!
//! Every error the crate surfaces to a caller carries one of a closed set of
//! [`ErrorCategory`] values. Categories decide the HTTP status code, the gRPC
//! status code and the human-readable title used when rendering, while the
//! original cause stays server-side for logging.

use http::StatusCode;
use thiserror::Error;
use tonic::Code;

use crate::render::ApiError;

/// Closed set of error classifications.
///
/// Internal error types declare their category through [`Categorized`];
/// anything that does not declare one renders as [`ErrorCategory::Unclassified`]
/// and is never exposed verbatim to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed request.
    BadRequest,
    /// Authenticated but not allowed.
    Forbidden,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Request payload failed validation.
    Validation,
    /// A parameter was present but invalid.
    InvalidParameter,
    /// Requested entity does not exist.
    NotFound,
    /// A required parameter was absent.
    MissingParameter,
    /// Unknown internal error; details are suppressed in responses.
    Unclassified,
}

impl ErrorCategory {
    /// Human-readable title rendered for this category.
    pub fn title(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::Unauthorized => "Unauthorized",
            Self::Validation | Self::InvalidParameter => "Unprocessable Entity",
            Self::NotFound => "Not Found",
            Self::MissingParameter => "Missing Parameter",
            Self::Unclassified => "Internal Server Error",
        }
    }

    /// HTTP status code for this category.
    pub fn http_status(self) -> StatusCode {
        match self {
            Self::BadRequest | Self::MissingParameter => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation | Self::InvalidParameter => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// gRPC status code for this category.
    pub fn grpc_code(self) -> Code {
        match self {
            Self::BadRequest
            | Self::MissingParameter
            | Self::Validation
            | Self::InvalidParameter => Code::InvalidArgument,
            Self::Forbidden | Self::Unauthorized => Code::PermissionDenied,
            Self::NotFound => Code::NotFound,
            Self::Unclassified => Code::Unknown,
        }
    }
}

/// Maps a gRPC status code back to an HTTP status code, for services that
/// bridge protocols. Unknown codes map to 500.
pub fn http_status_from_grpc(code: Code) -> StatusCode {
    match code {
        Code::Ok => StatusCode::OK,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Capability every renderable internal error implements.
///
/// Classification is a total function over this trait: an error declares its
/// own category, machine key and human detail, so the rendering pipeline never
/// inspects concrete types at runtime.
pub trait Categorized: std::error::Error + Send + Sync + 'static {
    /// The category this error belongs to.
    fn category(&self) -> ErrorCategory;

    /// Machine-readable short code, if the error carries one.
    fn key(&self) -> Option<String> {
        None
    }

    /// Human-readable detail safe to expose for classified categories.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Converts this error into its renderable form.
    ///
    /// Implementations delegate to [`ApiError::from_categorized`], which maps
    /// the category to a title and keeps the error as the server-side cause.
    /// [`ApiError`] itself returns `*self` unchanged, which makes
    /// classification idempotent.
    fn into_classified(self: Box<Self>) -> ApiError;
}

/// Errors produced by token handling, claims propagation and gate
/// configuration.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AuthError {
    /// No claims were supplied where claims are required.
    #[error("claims is required")]
    NoClaims,

    /// No signing or verification key was supplied.
    #[error("key is required")]
    NoKey,

    /// No token string was supplied.
    #[error("token is required")]
    NoToken,

    /// Signature verification failed or the validity window was violated.
    #[error("jwt token not valid")]
    InvalidToken {
        /// Underlying verification failure.
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// Claims failed structural validation before signing.
    #[error("invalid claims: {reason}")]
    InvalidClaims {
        /// What was structurally wrong.
        reason: String,
    },

    /// Token signing failed.
    #[error("token signing failed")]
    Signing {
        /// Underlying signing failure.
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// No verified claims were attached to the request.
    #[error("jwt claims missing from request")]
    NoClaimsInRequest,

    /// No raw token was attached to the request.
    #[error("jwt missing from request")]
    NoTokenInRequest,

    /// A notification was enqueued without a message.
    #[error("message is required")]
    NoNotificationMessage,

    /// The gate was built without a key resolver. Fatal configuration error.
    #[error("public key resolver is required")]
    NoKeyResolver,

    /// A bearer token was presented but failed verification.
    #[error("Authorization token is invalid")]
    AuthorizationTokenInvalid {
        /// The verification failure, logged but never serialized.
        #[source]
        source: Box<AuthError>,
    },

    /// No usable access token accompanied the request.
    #[error("A valid Authorization access token is required")]
    AccessTokenRequired,

    /// The Authorization header lacked the exact `Bearer ` prefix.
    #[error("Authorization Bearer is required before token")]
    BearerRequired,
}

impl Categorized for AuthError {
    fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthorizationTokenInvalid { .. }
            | Self::AccessTokenRequired
            | Self::BearerRequired => ErrorCategory::Unauthorized,
            _ => ErrorCategory::Unclassified,
        }
    }

    fn key(&self) -> Option<String> {
        match self {
            Self::AuthorizationTokenInvalid { .. } => {
                Some("ERR_AUTHORIZATION_TOKEN_INVALID".to_string())
            }
            Self::AccessTokenRequired => {
                Some("ERR_AUTHORIZATION_ACCESS_TOKEN_REQUIRED".to_string())
            }
            Self::BearerRequired => Some("ERR_AUTHORIZATION_BEARER_REQUIRED".to_string()),
            _ => None,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::AuthorizationTokenInvalid { .. }
            | Self::AccessTokenRequired
            | Self::BearerRequired => Some(self.to_string()),
            _ => None,
        }
    }

    fn into_classified(self: Box<Self>) -> ApiError {
        ApiError::from_categorized(self)
    }
}
