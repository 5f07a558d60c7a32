// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;

use principal_graph_core::PrincipalId;
use principal_graph_core::test_utils::{id, ids};

use crate::assert_all_stores;
use crate::membership::MembershipStore;

fn set(values: &[&str]) -> HashSet<PrincipalId> {
    ids(values).into_iter().collect()
}

#[tokio::test]
async fn missing_rows_are_empty() {
    assert_all_stores!(|store| async {
        let rows = store
            .get_members(&ids(&["g:acme:a", "g:acme:b"]))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![(id("g:acme:a"), HashSet::new()), (id("g:acme:b"), HashSet::new())]
        );

        let rows = store.get_memberships(&ids(&["u:acme:bob"])).await.unwrap();
        assert_eq!(rows, vec![(id("u:acme:bob"), HashSet::new())]);

        assert!(store.get_members(&[]).await.unwrap().is_empty());
    });
}

#[tokio::test]
async fn forward_index_merges_members() {
    assert_all_stores!(|store| async {
        store
            .add_members(&id("g:acme:a"), &set(&["u:acme:bob", "g:acme:b"]))
            .await
            .unwrap();

        // Adding an existing member again is a no-op.
        store
            .add_members(&id("g:acme:a"), &set(&["u:acme:bob", "u:acme:eve"]))
            .await
            .unwrap();

        let rows = store
            .get_members(&ids(&["g:acme:b", "g:acme:a"]))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (id("g:acme:b"), HashSet::new()),
                (
                    id("g:acme:a"),
                    set(&["u:acme:bob", "g:acme:b", "u:acme:eve"])
                ),
            ]
        );

        // The reverse index is stored independently and not touched.
        let rows = store.get_memberships(&ids(&["u:acme:bob"])).await.unwrap();
        assert!(rows[0].1.is_empty());
    });
}

#[tokio::test]
async fn reverse_index_batch() {
    assert_all_stores!(|store| async {
        store
            .add_memberships(&[
                (id("u:acme:bob"), set(&["g:acme:a", "g:acme:root"])),
                (id("g:acme:b"), set(&["g:acme:a"])),
                (id("u:acme:eve"), HashSet::new()),
            ])
            .await
            .unwrap();

        store
            .add_memberships(&[(id("u:acme:bob"), set(&["g:acme:other"]))])
            .await
            .unwrap();

        let rows = store
            .get_memberships(&ids(&["u:acme:bob", "g:acme:b", "u:acme:eve"]))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (
                    id("u:acme:bob"),
                    set(&["g:acme:a", "g:acme:root", "g:acme:other"])
                ),
                (id("g:acme:b"), set(&["g:acme:a"])),
                (id("u:acme:eve"), HashSet::new()),
            ]
        );

        // The forward index is stored independently and not touched.
        let rows = store.get_members(&ids(&["g:acme:a"])).await.unwrap();
        assert!(rows[0].1.is_empty());
    });
}

#[tokio::test]
async fn rows_larger_than_one_statement() {
    assert_all_stores!(|store| async {
        let group_id = id("g:acme:big");
        let members: HashSet<PrincipalId> = (0..20_000)
            .map(|i| PrincipalId::user("acme", &format!("user-{i}")).unwrap())
            .collect();

        store.add_members(&group_id, &members).await.unwrap();
        store
            .add_memberships(&[(group_id.clone(), members.clone())])
            .await
            .unwrap();

        let rows = store.get_members(&[group_id.clone()]).await.unwrap();
        assert_eq!(rows[0].1, members);

        let rows = store.get_memberships(&[group_id]).await.unwrap();
        assert_eq!(rows[0].1.len(), 20_000);

        // Lookups with more keys than bind parameters are split as well.
        let keys: Vec<PrincipalId> = (0..40_000)
            .map(|i| PrincipalId::group("acme", &format!("group-{i}")).unwrap())
            .collect();
        let rows = store.get_members(&keys).await.unwrap();
        assert_eq!(rows.len(), 40_000);
        assert!(rows.iter().all(|(_, members)| members.is_empty()));
    });
}
