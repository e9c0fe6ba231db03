//! Unit Tests
//!
//! Organized by domain. Token and gate tests sign real RS512 tokens with the
//! fixture keypair under `tests/fixtures/`.

mod common;

mod notify;
