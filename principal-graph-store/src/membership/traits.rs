// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::PrincipalId;

/// Row of a membership index: the key and the set of identifiers stored under it.
///
/// Only the presence of an identifier in the set is meaningful. An empty set is the "empty row"
/// returned for keys without any entry.
pub type IndexRow = (PrincipalId, HashSet<PrincipalId>);

/// Interface for storing and querying the forward and reverse membership indices.
///
/// Both indices are stored independently from each other. Implementations do not need to (and
/// usually can not) guarantee atomicity across rows or across the two indices.
pub trait MembershipStore {
    type Error: Error;

    /// Fetch forward index rows (group to direct members) for all given groups in one round
    /// trip.
    ///
    /// Returns exactly one row per requested key, in request order, with an empty set for groups
    /// without members.
    fn get_members(
        &self,
        group_ids: &[PrincipalId],
    ) -> impl Future<Output = Result<Vec<IndexRow>, Self::Error>>;

    /// Fetch reverse index rows (principal to all groups it is nested under) for all given
    /// principals in one round trip.
    ///
    /// Returns exactly one row per requested key, in request order, with an empty set for
    /// principals which are not a member of any group.
    fn get_memberships(
        &self,
        principal_ids: &[PrincipalId],
    ) -> impl Future<Output = Result<Vec<IndexRow>, Self::Error>>;

    /// Mark all given principals as direct members of a group in the forward index.
    ///
    /// This touches exactly one row and is applied completely or not at all. Members which are
    /// already present are left untouched.
    fn add_members(
        &self,
        group_id: &PrincipalId,
        members: &HashSet<PrincipalId>,
    ) -> impl Future<Output = Result<(), Self::Error>>;

    /// Append groups to the reverse index rows of many principals in one batch.
    ///
    /// The batch is applied on a best-effort basis: there is no atomicity across rows, rows
    /// written before a failure stay written and are not rolled back.
    fn add_memberships(&self, batch: &[IndexRow]) -> impl Future<Output = Result<(), Self::Error>>;
}
