// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixtures and fault-injecting stores for testing the directory.
use std::collections::HashSet;
use std::error::Error;
use std::sync::{Arc, RwLock};

use principal_graph_core::{PrincipalId, PrincipalRecord, Tenant};
use principal_graph_store::{IndexRow, MembershipStore, MemoryStore, PrincipalRow, PrincipalStore};
use thiserror::Error;
use tokio::sync::Notify;

use crate::Directory;

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Tenant used across tests.
pub fn test_tenant() -> Tenant {
    Tenant::new("acme", "Acme Corporation")
}

/// Create a group for every name in the test tenant.
pub async fn create_groups<S, E>(directory: &Directory<S>, names: &[&str]) -> Vec<PrincipalId>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    let tenant = test_tenant();
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let id = directory
            .create_group(&tenant, name, &format!("{name} group"))
            .await
            .expect("create group");
        ids.push(id);
    }
    ids
}

/// Create a user for every name in the test tenant.
pub async fn create_users<S, E>(directory: &Directory<S>, names: &[&str]) -> Vec<PrincipalId>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    let tenant = test_tenant();
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let id = directory
            .create_user(&tenant, name, name, "Tester")
            .await
            .expect("create user");
        ids.push(id);
    }
    ids
}

#[derive(Debug, Error)]
#[error("injected store failure")]
pub struct InjectedError;

/// Store operations a `FaultyStore` can be told to break.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fault {
    /// Writing reverse index rows fails.
    FailMembershipsWrite,

    /// Writing reverse index rows fails after the given number of rows was written.
    FailMembershipsWriteAfter(usize),

    /// Fetching forward index rows never completes.
    StallMembersFetch,

    /// Fetching principal rows fails.
    FailPrincipalsFetch,

    /// The next forward index write of the group waits until `FaultyStore::release` is called.
    HoldMembersWrite(PrincipalId),
}

/// In-memory store which fails or stalls on request.
#[derive(Clone, Debug, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Arc<RwLock<HashSet<Fault>>>,
    holding: Arc<Notify>,
    released: Arc<Notify>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&self, fault: Fault) {
        self.faults
            .write()
            .expect("acquire exclusive write access on faults")
            .insert(fault);
    }

    pub fn heal(&self) {
        self.faults
            .write()
            .expect("acquire exclusive write access on faults")
            .clear();
    }

    /// Wait until a write held back by `Fault::HoldMembersWrite` reached the store.
    pub async fn write_held(&self) {
        self.holding.notified().await;
    }

    /// Let the held back write continue.
    pub fn release(&self) {
        self.released.notify_one();
    }

    fn take(&self, fault: &Fault) -> bool {
        self.faults
            .write()
            .expect("acquire exclusive write access on faults")
            .remove(fault)
    }

    fn has(&self, fault: Fault) -> bool {
        self.faults
            .read()
            .expect("acquire shared read access on faults")
            .contains(&fault)
    }

    fn write_limit(&self) -> Option<usize> {
        self.faults
            .read()
            .expect("acquire shared read access on faults")
            .iter()
            .find_map(|fault| match fault {
                Fault::FailMembershipsWriteAfter(limit) => Some(*limit),
                _ => None,
            })
    }

    /// Underlying in-memory state, bypassing any injected fault.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

impl PrincipalStore for FaultyStore {
    type Error = InjectedError;

    async fn insert_principal(
        &self,
        id: &PrincipalId,
        record: PrincipalRecord,
    ) -> Result<bool, Self::Error> {
        let Ok(created) = self.inner.insert_principal(id, record).await;
        Ok(created)
    }

    async fn get_principals(&self, ids: &[PrincipalId]) -> Result<Vec<PrincipalRow>, Self::Error> {
        if self.has(Fault::FailPrincipalsFetch) {
            return Err(InjectedError);
        }
        let Ok(rows) = self.inner.get_principals(ids).await;
        Ok(rows)
    }
}

impl MembershipStore for FaultyStore {
    type Error = InjectedError;

    async fn get_members(&self, group_ids: &[PrincipalId]) -> Result<Vec<IndexRow>, Self::Error> {
        if self.has(Fault::StallMembersFetch) {
            std::future::pending::<()>().await;
        }
        let Ok(rows) = self.inner.get_members(group_ids).await;
        Ok(rows)
    }

    async fn get_memberships(
        &self,
        principal_ids: &[PrincipalId],
    ) -> Result<Vec<IndexRow>, Self::Error> {
        let Ok(rows) = self.inner.get_memberships(principal_ids).await;
        Ok(rows)
    }

    async fn add_members(
        &self,
        group_id: &PrincipalId,
        members: &HashSet<PrincipalId>,
    ) -> Result<(), Self::Error> {
        if self.take(&Fault::HoldMembersWrite(group_id.clone())) {
            self.holding.notify_one();
            self.released.notified().await;
        }

        let Ok(()) = self.inner.add_members(group_id, members).await;
        Ok(())
    }

    async fn add_memberships(&self, batch: &[IndexRow]) -> Result<(), Self::Error> {
        if self.has(Fault::FailMembershipsWrite) {
            return Err(InjectedError);
        }

        // Rows before the limit stay written, like a store without cross-row atomicity.
        if let Some(limit) = self.write_limit() {
            if batch.len() > limit {
                let Ok(()) = self.inner.add_memberships(&batch[..limit]).await;
                return Err(InjectedError);
            }
        }

        let Ok(()) = self.inner.add_memberships(batch).await;
        Ok(())
    }
}
