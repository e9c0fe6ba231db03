//! Auth Gate - JWT authentication and error rendering for platform services.
//!
//! This crate provides the pieces a service needs in front of its protected
//! handlers: signed-token creation and verification, a Tower authentication
//! gate that attaches verified identity to the request, and an error
//! classification pipeline that renders a bounded, sanitized JSON envelope
//! with consistent HTTP and gRPC status mappings.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod notify;
pub mod observability;
pub mod render;

pub use context::AuthContext;
pub use error::{http_status_from_grpc, AuthError, Categorized, ErrorCategory};
pub use jwt::{claims_from_bearer, create_token, parse_token, Claims, TokenType, BEARER_PREFIX};
pub use middleware::{
    AuthGateBuilder, AuthGateLayer, KeyResolver, RequestIdLayer, RequestIds, StaticKeyResolver,
    PROVENANCE_ID_HEADER, REQUEST_ID_HEADER,
};
pub use notify::{Notification, NotificationPriority, Notifier, NotifyError, NotifyHandle};
pub use render::{ApiError, ErrorEnvelope, OpaqueError, ERR_UNEXPECTED};
