// SPDX-License-Identifier: MIT OR Apache-2.0

//! Breadth-first expansion of groups into all principals reachable through the forward index.
use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::PrincipalId;
use principal_graph_store::{MembershipStore, PrincipalStore};
use tracing::trace;

use crate::directory::Directory;
use crate::error::{DirectoryError, StorageError};

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Expand the given groups into the set of all principals transitively contained in them.
    ///
    /// Groups are expanded level by level, fetching the forward index rows of a whole level in
    /// one go. With `users_only` the result holds only users, otherwise nested groups are part of
    /// it as well. The starting groups themselves are not part of the result unless they are
    /// reachable from another starting group. User identifiers among the starting points are
    /// ignored.
    ///
    /// Every group is expanded at most once. On an (unexpected) cycle in the forward index this
    /// terminates but silently yields an incomplete result.
    pub async fn explode(
        &self,
        group_ids: &[PrincipalId],
        users_only: bool,
    ) -> Result<HashSet<PrincipalId>, DirectoryError<E>> {
        Ok(self.closure(group_ids, users_only).await?)
    }

    pub(crate) async fn closure(
        &self,
        group_ids: &[PrincipalId],
        users_only: bool,
    ) -> Result<HashSet<PrincipalId>, StorageError<E>> {
        let mut visited: HashSet<PrincipalId> = HashSet::new();
        let mut result = HashSet::new();

        let mut frontier: Vec<PrincipalId> = group_ids
            .iter()
            .filter(|id| id.is_group() && visited.insert((*id).clone()))
            .cloned()
            .collect();

        let mut level = 0;
        while !frontier.is_empty() {
            self.check_cancelled()?;
            trace!(level, groups = frontier.len(), "expand membership level");

            let mut next = Vec::new();
            for (_, members) in self.member_rows(&frontier).await? {
                for member in members {
                    if member.is_group() {
                        if !users_only {
                            result.insert(member.clone());
                        }
                        if visited.insert(member.clone()) {
                            next.push(member);
                        }
                    } else {
                        result.insert(member);
                    }
                }
            }

            frontier = next;
            level += 1;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use principal_graph_core::PrincipalId;
    use principal_graph_core::test_utils::{id, ids};
    use principal_graph_store::{MembershipStore, MemoryStore};

    use crate::{Directory, DirectoryConfig};

    fn set(values: &[&str]) -> HashSet<PrincipalId> {
        ids(values).into_iter().collect()
    }

    async fn add(store: &MemoryStore, group: &str, members: &[&str]) {
        store.add_members(&id(group), &set(members)).await.unwrap();
    }

    #[tokio::test]
    async fn users_and_nested_groups() {
        let store = MemoryStore::new();
        add(&store, "g:acme:g", &["u:acme:a", "g:acme:b"]).await;
        add(&store, "g:acme:b", &["u:acme:c"]).await;
        let directory = Directory::new(store);

        let users = directory.explode(&ids(&["g:acme:g"]), true).await.unwrap();
        assert_eq!(users, set(&["u:acme:a", "u:acme:c"]));

        let all = directory.explode(&ids(&["g:acme:g"]), false).await.unwrap();
        assert_eq!(all, set(&["u:acme:a", "g:acme:b", "u:acme:c"]));
    }

    #[tokio::test]
    async fn shared_subgroups_are_expanded_once() {
        let store = MemoryStore::new();
        add(&store, "g:acme:root", &["g:acme:left", "g:acme:right"]).await;
        add(&store, "g:acme:left", &["g:acme:shared", "u:acme:l"]).await;
        add(&store, "g:acme:right", &["g:acme:shared", "u:acme:r"]).await;
        add(&store, "g:acme:shared", &["u:acme:s"]).await;
        let directory = Directory::new(store);

        let users = directory
            .explode(&ids(&["g:acme:root", "g:acme:left"]), true)
            .await
            .unwrap();
        assert_eq!(users, set(&["u:acme:l", "u:acme:r", "u:acme:s"]));
    }

    #[tokio::test]
    async fn terminates_on_corrupt_cycle() {
        let store = MemoryStore::new();
        add(&store, "g:acme:a", &["g:acme:b", "u:acme:x"]).await;
        add(&store, "g:acme:b", &["g:acme:a", "u:acme:y"]).await;
        let directory = Directory::new(store);

        let all = directory.explode(&ids(&["g:acme:a"]), false).await.unwrap();
        assert_eq!(all, set(&["g:acme:a", "g:acme:b", "u:acme:x", "u:acme:y"]));
    }

    #[tokio::test]
    async fn wide_levels_are_fetched_in_chunks() {
        let store = MemoryStore::new();
        let subgroups: Vec<String> = (0..10).map(|i| format!("g:acme:sub-{i}")).collect();
        let subgroups: Vec<&str> = subgroups.iter().map(String::as_str).collect();
        add(&store, "g:acme:root", &subgroups).await;
        for (i, subgroup) in subgroups.iter().enumerate() {
            let user = format!("u:acme:user-{i}");
            add(&store, subgroup, &[user.as_str()]).await;
        }

        let config = DirectoryConfig {
            max_batch_size: 3,
            ..Default::default()
        };
        let directory = Directory::with_config(store, config);

        let users = directory
            .explode(&ids(&["g:acme:root"]), true)
            .await
            .unwrap();
        assert_eq!(users.len(), 10);
    }

    #[tokio::test]
    async fn empty_and_user_starts() {
        let directory = Directory::new(MemoryStore::new());
        assert!(directory.explode(&[], true).await.unwrap().is_empty());
        assert!(
            directory
                .explode(&ids(&["u:acme:a", "g:acme:empty"]), false)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
