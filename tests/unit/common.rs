//! Shared fixtures: RSA test keys and claim builders.

use auth_gate::{Claims, TokenType};
use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

pub const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_test.pem");
pub const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_test.pub.pem");
pub const OTHER_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_other.pub.pem");

pub fn signing_key() -> EncodingKey {
    EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes()).expect("fixture private key")
}

pub fn verifying_key() -> DecodingKey {
    DecodingKey::from_rsa_pem(RSA_PUBLIC_PEM.as_bytes()).expect("fixture public key")
}

pub fn mismatched_verifying_key() -> DecodingKey {
    DecodingKey::from_rsa_pem(OTHER_PUBLIC_PEM.as_bytes()).expect("fixture public key")
}

pub fn access_claims() -> Claims {
    Claims::new(42, "amelia", TokenType::Access, "auth-gate-tests", Duration::hours(1))
}

pub fn refresh_claims() -> Claims {
    Claims::new(42, "amelia", TokenType::Refresh, "auth-gate-tests", Duration::days(30))
}

pub fn expired_claims() -> Claims {
    let mut claims = access_claims();
    claims.iat -= 7200;
    claims.exp -= 7200;
    claims
}
