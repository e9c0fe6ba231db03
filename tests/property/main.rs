//! Property-Based Tests
//!
//! Envelope wire-format invariants and token codec round trips.

mod envelope;
mod token;
