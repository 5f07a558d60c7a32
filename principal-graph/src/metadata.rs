// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetching and hydrating principal metadata.
use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::{Principal, PrincipalId};
use principal_graph_store::{MembershipStore, PrincipalStore};
use tracing::debug;

use crate::directory::Directory;
use crate::error::DirectoryError;

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    /// Fetch and hydrate a single principal.
    ///
    /// Fails with `NotFound` when no metadata is stored for the identifier and also when the
    /// principal is a private group: callers can not tell a hidden group from a missing one.
    pub async fn fetch_one(&self, id: &PrincipalId) -> Result<Principal, DirectoryError<E>> {
        let rows = self.principal_rows(std::slice::from_ref(id)).await?;

        let Some((id, Some(record))) = rows.into_iter().next() else {
            return Err(DirectoryError::NotFound(id.clone()));
        };

        if record.is_empty() {
            return Err(DirectoryError::NotFound(id));
        }

        let principal = Principal::hydrate(id, record);
        if principal.as_group().is_some_and(|group| group.is_private()) {
            debug!(principal_id = %principal.id(), "hide private group");
            return Err(DirectoryError::NotFound(principal.id().clone()));
        }

        Ok(principal)
    }

    /// Fetch and hydrate many principals in one go.
    ///
    /// Identifiers without stored metadata are silently dropped, the result can therefore contain
    /// fewer principals than requested. Duplicate identifiers are fetched once. The order of the
    /// request is kept.
    pub async fn fetch_many(
        &self,
        ids: &[PrincipalId],
    ) -> Result<Vec<Principal>, DirectoryError<E>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let ids: Vec<PrincipalId> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();

        let rows = self.principal_rows(&ids).await?;

        let principals: Vec<Principal> = rows
            .into_iter()
            .filter_map(|(id, record)| {
                record
                    .filter(|record| !record.is_empty())
                    .map(|record| Principal::hydrate(id, record))
            })
            .collect();

        if principals.len() < ids.len() {
            debug!(
                requested = ids.len(),
                found = principals.len(),
                "dropped principals without metadata"
            );
        }

        Ok(principals)
    }
}
