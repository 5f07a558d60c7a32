// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use principal_graph_core::{PrincipalId, PrincipalRecord};

use crate::memory::MemoryStore;
use crate::principals::{PrincipalRow, PrincipalStore};

#[derive(Clone, Debug, Default)]
pub struct PrincipalMemoryStore {
    rows: Arc<RwLock<HashMap<PrincipalId, PrincipalRecord>>>,
}

impl PrincipalStore for MemoryStore {
    type Error = Infallible;

    async fn insert_principal(
        &self,
        id: &PrincipalId,
        record: PrincipalRecord,
    ) -> Result<bool, Self::Error> {
        let mut rows = self
            .principals
            .rows
            .write()
            .expect("acquire exclusive write access on principals");
        Ok(rows.insert(id.clone(), record).is_none())
    }

    async fn get_principals(&self, ids: &[PrincipalId]) -> Result<Vec<PrincipalRow>, Self::Error> {
        let rows = self
            .principals
            .rows
            .read()
            .expect("acquire shared read access on principals");
        Ok(ids
            .iter()
            .map(|id| (id.clone(), rows.get(id).cloned()))
            .collect())
    }
}
