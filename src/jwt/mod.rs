//! Signed-token creation and verification.

pub mod claims;
pub mod codec;

pub use claims::{Claims, TokenType};
pub use codec::{claims_from_bearer, create_token, parse_token, ALGORITHM, BEARER_PREFIX};
