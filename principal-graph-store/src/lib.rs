// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interfaces and implementations of the persistence layer of the principal directory.
//!
//! The directory keeps two independently stored views of group membership next to the principal
//! metadata:
//!
//! - The **forward index** maps a group to its _direct_ members (users and groups).
//! - The **reverse index** maps a principal to _every_ group it is nested under, directly or
//!   transitively. It is maintained eagerly at write time and is not the structural inverse of
//!   the forward index.
//!
//! Backing stores only need to offer row lookups by an exact list of keys and best-effort
//! batched writes: a multi-key lookup never fails for missing keys (it returns an empty row
//! instead) and a batched write gives no cross-row atomicity, rows written before a failure stay
//! written. Keeping both views consistent is the responsibility of the caller.
//!
//! ## Store implementations
//!
//! Two backends are provided, both implementing `PrincipalStore` and `MembershipStore`:
//!
//! - `MemoryStore` keeps all state in memory and never fails. It is gated by the `memory`
//!   feature flag and meant for tests and embedding.
//! - `SqliteStore` persists state in a SQLite database. It is gated by the `sqlite` feature flag.
pub mod membership;
#[cfg(feature = "memory")]
pub mod memory;
pub mod principals;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use membership::{IndexRow, MembershipStore};
#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use principals::{PrincipalRow, PrincipalStore};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteError, SqliteStore, SqliteStoreBuilder};
