// SPDX-License-Identifier: MIT OR Apache-2.0

/// Macro to run the same test logic against all store backend implementations.
///
/// This macro takes a closure that will be executed against each store type:
/// - In-memory store (`MemoryStore`)
/// - SQLite store (`SqliteStore`)
///
/// Every run receives a fresh, empty store.
///
/// ## Example
///
/// ```rust
/// # use principal_graph_core::PrincipalId;
/// # use principal_graph_store::PrincipalStore;
/// # use principal_graph_store::assert_all_stores;
/// # async fn run() {
/// let bob = PrincipalId::user("acme", "bob").unwrap();
/// assert_all_stores!(|store| async {
///     let rows = store.get_principals(&[bob.clone()]).await.unwrap();
///     assert_eq!(rows[0].1, None);
/// });
/// # }
/// ```
#[macro_export]
macro_rules! assert_all_stores {
    (|$store:ident| $test_body:expr) => {
        // Test with MemoryStore.
        {
            let $store = $crate::memory::MemoryStore::new();
            $test_body.await;
        }

        // Test with SqliteStore.
        {
            let $store = $crate::sqlite::SqliteStoreBuilder::new()
                .random_memory_url()
                // We're running in a single test thread and can't have more parallel connections.
                .max_connections(1)
                .build()
                .await
                .unwrap();
            $test_body.await;
        }
    };
}
