// SPDX-License-Identifier: MIT OR Apache-2.0

//! Committing new membership edges to both indices.
use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::PrincipalId;
use principal_graph_store::{IndexRow, MembershipStore, PrincipalStore};
use tracing::{debug, info, warn};

use crate::dag::closing_member;
use crate::directory::Directory;
use crate::error::{DirectoryError, InvalidPrincipal};

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Add users and groups as direct members of a group.
    ///
    /// The forward index of the group receives the new members. Afterwards every new member and
    /// every principal reachable through a new group member gets the group and all of its
    /// ancestors appended to its reverse index row.
    ///
    /// Nothing is written when the target is not an existing group, a member is not a resolvable
    /// principal, the group is among the members or a member is already an ancestor of the group.
    ///
    /// The two indices are written one after another without any atomicity across them. When
    /// writing the reverse index fails after the forward index was written this returns
    /// `DirectoryError::ReverseIndexStale`, the group should then be passed to `reconcile`.
    ///
    /// Concurrent calls are not synchronised: two calls nesting groups into each other's
    /// hierarchy at the same time can leave ancestors missing in the reverse index.
    pub async fn add_members(
        &self,
        group_id: &PrincipalId,
        members: &[PrincipalId],
    ) -> Result<(), DirectoryError<E>> {
        if !group_id.is_group() {
            return Err(InvalidPrincipal::NotAGroup(group_id.clone()).into());
        }

        if members.is_empty() {
            return Err(InvalidPrincipal::NoPrincipals.into());
        }

        let mut seen = HashSet::with_capacity(members.len());
        let members: Vec<PrincipalId> = members
            .iter()
            .filter(|member| seen.insert(*member))
            .cloned()
            .collect();

        if members.contains(group_id) {
            return Err(InvalidPrincipal::SelfMembership(group_id.clone()).into());
        }

        // Resolve the target group and all members in one go.
        let mut lookup = members.clone();
        lookup.push(group_id.clone());
        let mut group_exists = false;
        let mut unresolved = Vec::new();
        for (id, record) in self.principal_rows(&lookup).await? {
            let exists = record.is_some_and(|record| !record.is_empty());
            if &id == group_id {
                group_exists = exists;
            } else if !exists {
                unresolved.push(id);
            }
        }

        if !group_exists {
            return Err(DirectoryError::NotFound(group_id.clone()));
        }

        if !unresolved.is_empty() {
            return Err(InvalidPrincipal::Unresolved(unresolved).into());
        }

        // The ancestors of the group serve both the cycle check and the propagation below.
        let parent_groups = self.ancestors(group_id).await?;

        if let Some(member_id) = closing_member(&parent_groups, &members) {
            debug!(%group_id, %member_id, "reject membership closing a cycle");
            return Err(DirectoryError::CycleDetected {
                group_id: group_id.clone(),
                member_id: member_id.clone(),
            });
        }

        let direct: HashSet<PrincipalId> = members.iter().cloned().collect();
        self.write_members(group_id, &direct).await?;
        debug!(%group_id, members = direct.len(), "updated forward index");

        // From here on the forward index is written, every failure leaves the reverse index stale.
        let stale = |source| {
            warn!(%group_id, error = %source, "reverse index is stale after partial write");
            DirectoryError::ReverseIndexStale {
                group_id: group_id.clone(),
                source,
            }
        };

        let nested: Vec<PrincipalId> = members
            .iter()
            .filter(|member| member.is_group())
            .cloned()
            .collect();
        let mut affected = self.closure(&nested, false).await.map_err(stale)?;
        affected.extend(direct);

        let mut ancestry = parent_groups;
        ancestry.insert(group_id.clone());

        let batch: Vec<IndexRow> = affected
            .into_iter()
            .map(|principal_id| (principal_id, ancestry.clone()))
            .collect();
        self.write_memberships(&batch).await.map_err(stale)?;

        info!(
            %group_id,
            members = members.len(),
            affected = batch.len(),
            ancestors = ancestry.len(),
            "added group members"
        );

        Ok(())
    }

    /// Add members given as raw identifiers, as they arrive from a transport layer.
    ///
    /// Fails with `InvalidIdentifier` for a malformed group identifier and with
    /// `InvalidPrincipalKind` for a member which is neither a user nor a group identifier.
    pub async fn add_members_by_id(
        &self,
        group_id: &str,
        members: &[impl AsRef<str>],
    ) -> Result<(), DirectoryError<E>> {
        let group_id = PrincipalId::classify(group_id)?;

        let members = members
            .iter()
            .map(|member| {
                PrincipalId::classify(member.as_ref())
                    .map_err(|_| InvalidPrincipal::Unrecognised(member.as_ref().to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.add_members(&group_id, &members).await
    }
}
