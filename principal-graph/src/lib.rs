// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-tenant directory of users and groups with nested, acyclic group membership.
//!
//! Groups can contain users and other groups. Membership is kept in two denormalised views in
//! the store: a forward index of the direct members of every group and a reverse index holding,
//! for every principal, _all_ groups it is nested under. The reverse index is maintained eagerly
//! when members are added, which turns both "is this an ancestor" (cycle prevention) and "which
//! groups is this principal part of" into single lookups.
//!
//! The store does not offer graph queries nor transactions across rows. The `Directory` therefore
//! reads the hierarchy level by level with multi-key lookups and writes both indices one after
//! another. A failure between these writes is reported as `DirectoryError::ReverseIndexStale`,
//! `Directory::reconcile` repairs the reverse index from the forward index afterwards.
//!
//! ## Example
//!
//! ```
//! # use principal_graph::Directory;
//! # use principal_graph_core::Tenant;
//! # use principal_graph_store::MemoryStore;
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = Directory::new(MemoryStore::new());
//! let tenant = Tenant::new("cam", "Cambridge");
//!
//! let staff = directory.create_group(&tenant, "staff", "All staff").await?;
//! let team = directory.create_group(&tenant, "oae-team", "The OAE team").await?;
//! let ada = directory.create_user(&tenant, "ada", "Ada", "Lovelace").await?;
//!
//! directory.add_members(&team, &[ada.clone()]).await?;
//! directory.add_members(&staff, &[team.clone()]).await?;
//!
//! // Ada is part of both groups now.
//! assert_eq!(directory.member_of(&ada).await?, vec![team.clone(), staff.clone()]);
//! assert!(directory.group_users(&staff).await?.contains(&ada));
//!
//! // Nesting the staff group into the team would close a cycle.
//! assert!(directory.add_members(&team, &[staff]).await.is_err());
//! # Ok(())
//! # }
//! ```
mod closure;
mod config;
mod dag;
mod directory;
mod error;
mod groups;
mod maintainer;
mod metadata;
mod reconcile;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use config::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_ROUND_TRIP_TIMEOUT, DirectoryConfig};
pub use directory::Directory;
pub use error::{DirectoryError, ErrorKind, InvalidPrincipal, StorageError};
