// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use principal_graph_core::PrincipalId;

use crate::membership::{IndexRow, MembershipStore};
use crate::memory::MemoryStore;

type Index = HashMap<PrincipalId, HashSet<PrincipalId>>;

/// Forward and reverse index, each behind its own lock.
#[derive(Clone, Debug, Default)]
pub struct MembershipMemoryStore {
    forward: Arc<RwLock<Index>>,
    reverse: Arc<RwLock<Index>>,
}

fn read_rows(index: &RwLock<Index>, keys: &[PrincipalId]) -> Vec<IndexRow> {
    let index = index
        .read()
        .expect("acquire shared read access on membership index");
    keys.iter()
        .map(|key| (key.clone(), index.get(key).cloned().unwrap_or_default()))
        .collect()
}

impl MembershipStore for MemoryStore {
    type Error = Infallible;

    async fn get_members(&self, group_ids: &[PrincipalId]) -> Result<Vec<IndexRow>, Self::Error> {
        Ok(read_rows(&self.membership.forward, group_ids))
    }

    async fn get_memberships(
        &self,
        principal_ids: &[PrincipalId],
    ) -> Result<Vec<IndexRow>, Self::Error> {
        Ok(read_rows(&self.membership.reverse, principal_ids))
    }

    async fn add_members(
        &self,
        group_id: &PrincipalId,
        members: &HashSet<PrincipalId>,
    ) -> Result<(), Self::Error> {
        let mut forward = self
            .membership
            .forward
            .write()
            .expect("acquire exclusive write access on forward index");
        forward
            .entry(group_id.clone())
            .or_default()
            .extend(members.iter().cloned());
        Ok(())
    }

    async fn add_memberships(&self, batch: &[IndexRow]) -> Result<(), Self::Error> {
        let mut reverse = self
            .membership
            .reverse
            .write()
            .expect("acquire exclusive write access on reverse index");
        for (principal_id, groups) in batch {
            reverse
                .entry(principal_id.clone())
                .or_default()
                .extend(groups.iter().cloned());
        }
        Ok(())
    }
}
