// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data types of a multi-tenant principal directory.
//!
//! A principal is either a user or a group and is addressed by an identifier of the form
//! `<kind>:<tenant>:<name>`, where `<kind>` is `u` for users and `g` for groups. The kind and the
//! tenant of a principal are never stored separately: they are always derived from the
//! identifier, which makes `PrincipalId` the single source of truth for classification.
//!
//! ```
//! use principal_graph_core::{PrincipalId, PrincipalKind};
//!
//! let id: PrincipalId = "g:cam:oae-team".parse().unwrap();
//! assert_eq!(id.kind(), PrincipalKind::Group);
//! assert_eq!(id.tenant(), "cam");
//! assert_eq!(id.to_string(), "g:cam:oae-team");
//! ```
mod identifier;
mod principal;
mod tenant;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use identifier::{IdentifierError, PrincipalId, PrincipalKind};
pub use principal::{Group, Principal, PrincipalRecord, Privacy, User};
pub use tenant::Tenant;
