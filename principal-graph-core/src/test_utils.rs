// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shorthands for writing tests against principal identifiers.
use crate::PrincipalId;

/// Parse an identifier, panicking on invalid input.
pub fn id(value: &str) -> PrincipalId {
    value.parse().expect("valid principal identifier")
}

/// Parse a list of identifiers, panicking on invalid input.
pub fn ids(values: &[&str]) -> Vec<PrincipalId> {
    values.iter().map(|value| id(value)).collect()
}
