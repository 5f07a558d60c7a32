// SPDX-License-Identifier: MIT OR Apache-2.0

use principal_graph_core::test_utils::{id, ids};
use principal_graph_core::{PrincipalRecord, Privacy};

use crate::assert_all_stores;
use crate::principals::PrincipalStore;

#[tokio::test]
async fn insert_and_get() {
    assert_all_stores!(|store| async {
        let group = PrincipalRecord::group("Oak", "Tree people", Some(Privacy::Public));
        let user = PrincipalRecord::user("Ada", "Lovelace");
        let (oak, ada) = (id("g:acme:oak"), id("u:acme:ada"));

        assert!(store.insert_principal(&oak, group.clone()).await.unwrap());
        assert!(store.insert_principal(&ada, user.clone()).await.unwrap());

        let rows = store
            .get_principals(&ids(&["u:acme:ada", "g:acme:missing", "g:acme:oak"]))
            .await
            .unwrap();

        // One row per requested identifier, in request order.
        assert_eq!(
            rows,
            vec![
                (id("u:acme:ada"), Some(user)),
                (id("g:acme:missing"), None),
                (id("g:acme:oak"), Some(group)),
            ]
        );
    });
}

#[tokio::test]
async fn overwrite_existing_row() {
    assert_all_stores!(|store| async {
        let first = PrincipalRecord::group("Oak", "", Some(Privacy::Public));
        let second = PrincipalRecord::group("Birch", "Renamed", Some(Privacy::Private));
        let oak = id("g:acme:oak");

        assert!(store.insert_principal(&oak, first).await.unwrap());

        // Inserting the same identifier again reports an existing row and replaces all fields.
        assert!(!store.insert_principal(&oak, second.clone()).await.unwrap());

        let rows = store.get_principals(&[oak.clone()]).await.unwrap();
        assert_eq!(rows, vec![(oak, Some(second))]);
    });
}

#[tokio::test]
async fn unset_fields_stay_unset() {
    assert_all_stores!(|store| async {
        store
            .insert_principal(&id("g:acme:bare"), PrincipalRecord::default())
            .await
            .unwrap();

        let rows = store.get_principals(&ids(&["g:acme:bare"])).await.unwrap();
        let record = rows[0].1.clone().unwrap();
        assert!(record.is_empty());
        assert_eq!(record.group_privacy, None);
    });
}

#[tokio::test]
async fn empty_and_duplicate_requests() {
    assert_all_stores!(|store| async {
        assert!(store.get_principals(&[]).await.unwrap().is_empty());

        let user = PrincipalRecord {
            user_first_name: Some("Bob".into()),
            ..Default::default()
        };
        store
            .insert_principal(&id("u:acme:bob"), user.clone())
            .await
            .unwrap();

        let rows = store
            .get_principals(&ids(&["u:acme:bob", "u:acme:bob"]))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                (id("u:acme:bob"), Some(user.clone())),
                (id("u:acme:bob"), Some(user)),
            ]
        );
    });
}
