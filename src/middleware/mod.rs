//! Tower middleware: the authentication gate and request id propagation.

pub mod auth;
pub mod request_id;

pub use auth::{AuthGate, AuthGateBuilder, AuthGateLayer, KeyResolver, StaticKeyResolver};
pub use request_id::{RequestIdLayer, RequestIds, PROVENANCE_ID_HEADER, REQUEST_ID_HEADER};
