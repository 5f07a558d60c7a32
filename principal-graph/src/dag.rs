// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeping group membership a directed acyclic graph.
//!
//! The check relies on the reverse index holding the _full_ ancestor closure of every group: a
//! candidate member closes a cycle exactly when it is already one of the ancestors of the group it
//! gets added to. This makes the check a single lookup instead of a graph search, at the price of
//! being only as correct as the reverse index is complete.
use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::PrincipalId;
use principal_graph_store::{MembershipStore, PrincipalStore};

use crate::directory::Directory;
use crate::error::DirectoryError;

/// First candidate which is already an ancestor of the group and would therefore close a cycle.
pub(crate) fn closing_member<'a>(
    ancestors: &HashSet<PrincipalId>,
    candidates: &'a [PrincipalId],
) -> Option<&'a PrincipalId> {
    candidates
        .iter()
        .find(|candidate| candidate.is_group() && ancestors.contains(*candidate))
}

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Returns `true` if adding the candidates as members of the group would make the group
    /// (transitively) contain itself.
    ///
    /// Adding a group to itself is always reported as a cycle, without touching the store.
    pub async fn would_create_cycle(
        &self,
        group_id: &PrincipalId,
        candidates: &[PrincipalId],
    ) -> Result<bool, DirectoryError<E>> {
        if candidates.contains(group_id) {
            return Ok(true);
        }

        let ancestors = self.ancestors(group_id).await?;
        Ok(closing_member(&ancestors, candidates).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use principal_graph_core::test_utils::{id, ids};
    use principal_graph_store::{MembershipStore, MemoryStore};

    use crate::Directory;

    use super::closing_member;

    #[test]
    fn only_ancestors_close_a_cycle() {
        let ancestors: HashSet<_> = ids(&["g:acme:root", "g:acme:parent"]).into_iter().collect();

        let candidates = ids(&["u:acme:ada", "g:acme:child", "g:acme:parent"]);
        assert_eq!(
            closing_member(&ancestors, &candidates),
            Some(&id("g:acme:parent"))
        );

        let candidates = ids(&["u:acme:ada", "g:acme:child"]);
        assert_eq!(closing_member(&ancestors, &candidates), None);
    }

    #[tokio::test]
    async fn ancestor_candidate_is_rejected() {
        let store = MemoryStore::new();

        // "b" is nested under "a", which is nested under "root".
        store
            .add_memberships(&[(
                id("g:acme:b"),
                ids(&["g:acme:a", "g:acme:root"]).into_iter().collect(),
            )])
            .await
            .unwrap();

        let directory = Directory::new(store);
        let b = id("g:acme:b");

        for ancestor in ["g:acme:root", "g:acme:a", "g:acme:b"] {
            let closes_cycle = directory.would_create_cycle(&b, &[id(ancestor)]).await;
            assert!(closes_cycle.unwrap(), "{ancestor} closes a cycle");
        }
        assert!(
            !directory
                .would_create_cycle(&b, &ids(&["g:acme:c", "u:acme:ada"]))
                .await
                .unwrap()
        );

        // The other direction is fine, "root" already contains "b" indirectly.
        assert!(
            !directory
                .would_create_cycle(&id("g:acme:root"), &ids(&["g:acme:b"]))
                .await
                .unwrap()
        );
    }
}
