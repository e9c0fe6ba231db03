//! Token codec round-trip properties.
//!
//! Signing is real RSA, so the case count is kept low.

use auth_gate::{create_token, parse_token, AuthError, Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey};
use proptest::prelude::*;

const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_test.pem");
const RSA_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_test.pub.pem");
const OTHER_PUBLIC_PEM: &str = include_str!("../fixtures/rsa_other.pub.pem");

fn signing_key() -> EncodingKey {
    EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes()).expect("fixture private key")
}

fn verifying_key() -> DecodingKey {
    DecodingKey::from_rsa_pem(RSA_PUBLIC_PEM.as_bytes()).expect("fixture public key")
}

fn mismatched_verifying_key() -> DecodingKey {
    DecodingKey::from_rsa_pem(OTHER_PUBLIC_PEM.as_bytes()).expect("fixture public key")
}

fn arb_token_type() -> impl Strategy<Value = TokenType> {
    prop_oneof![Just(TokenType::Access), Just(TokenType::Refresh)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// parse(create(claims)) returns the claims unchanged for any valid
    /// claims.
    #[test]
    fn claims_round_trip(
        user_id in any::<u64>(),
        username in "[a-zA-Z0-9_]{1,16}",
        token_type in arb_token_type(),
        ttl_secs in 60i64..86_400,
    ) {
        let claims = Claims::new(
            user_id,
            username,
            token_type,
            "auth-gate-props",
            chrono::Duration::seconds(ttl_secs),
        );

        let token = create_token(&claims, Some(&signing_key())).unwrap();
        let parsed = parse_token(&token, Some(&verifying_key())).unwrap();
        prop_assert_eq!(parsed, claims);
    }

    /// A token never verifies against a public key that does not match the
    /// signing private key.
    #[test]
    fn mismatched_key_always_rejects(user_id in any::<u64>()) {
        let claims = Claims::new(
            user_id,
            "someone",
            TokenType::Access,
            "auth-gate-props",
            chrono::Duration::hours(1),
        );

        let token = create_token(&claims, Some(&signing_key())).unwrap();
        let result = parse_token(&token, Some(&mismatched_verifying_key()));
        let is_invalid_token = matches!(result, Err(AuthError::InvalidToken { .. }));
        prop_assert!(is_invalid_token);
    }
}
