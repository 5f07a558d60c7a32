// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::HashSet;
use std::error::Error;

use principal_graph_core::PrincipalId;
use principal_graph_store::{IndexRow, MembershipStore, PrincipalRow, PrincipalStore};
use tokio_util::sync::CancellationToken;

use crate::config::DirectoryConfig;
use crate::error::StorageError;

/// Directory of users and groups with acyclic, nested group membership.
///
/// The directory is a thin, stateless layer on top of a store implementing both
/// `PrincipalStore` and `MembershipStore`. It keeps no state between calls: every operation reads
/// what it needs, computes and writes, so one instance can be shared by many concurrent callers.
///
/// Every round trip to the store is bounded by `DirectoryConfig::round_trip_timeout` and aborted
/// as soon as the cancellation token of the directory fires.
#[derive(Clone, Debug)]
pub struct Directory<S> {
    store: S,
    config: DirectoryConfig,
    cancel: CancellationToken,
}

impl<S> Directory<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, DirectoryConfig::default())
    }

    pub fn with_config(store: S, config: DirectoryConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Bind the directory to a caller-provided cancellation token.
    ///
    /// Cancelling the token aborts all running and future operations of this directory with
    /// `StorageError::Cancelled`.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    fn batch_size(&self) -> usize {
        self.config.max_batch_size.max(1)
    }

    /// Race a single store round trip against the configured timeout and the cancellation token.
    pub(crate) async fn round_trip<F, R, E>(&self, call: F) -> Result<R, StorageError<E>>
    where
        F: Future<Output = Result<R, E>>,
    {
        if self.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }

        let timeout = self.config.round_trip_timeout;
        tokio::select! {
            biased;

            _ = self.cancel.cancelled() => Err(StorageError::Cancelled),
            result = tokio::time::timeout(timeout, call) => match result {
                Ok(result) => result.map_err(StorageError::Backend),
                Err(_) => Err(StorageError::Timeout(timeout)),
            },
        }
    }
}

impl<S, E> Directory<S>
where
    S: PrincipalStore<Error = E> + MembershipStore<Error = E>,
    E: Error,
{
    pub(crate) fn check_cancelled(&self) -> Result<(), StorageError<E>> {
        if self.cancel.is_cancelled() {
            return Err(StorageError::Cancelled);
        }
        Ok(())
    }

    /// Principal rows for all given identifiers, fetched in chunks.
    pub(crate) async fn principal_rows(
        &self,
        ids: &[PrincipalId],
    ) -> Result<Vec<PrincipalRow>, StorageError<E>> {
        let mut rows = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.batch_size()) {
            rows.extend(self.round_trip(self.store.get_principals(chunk)).await?);
        }
        Ok(rows)
    }

    /// Forward index rows for all given groups, fetched in chunks.
    pub(crate) async fn member_rows(
        &self,
        group_ids: &[PrincipalId],
    ) -> Result<Vec<IndexRow>, StorageError<E>> {
        let mut rows = Vec::with_capacity(group_ids.len());
        for chunk in group_ids.chunks(self.batch_size()) {
            rows.extend(self.round_trip(self.store.get_members(chunk)).await?);
        }
        Ok(rows)
    }

    /// Reverse index rows for all given principals, fetched in chunks.
    pub(crate) async fn membership_rows(
        &self,
        principal_ids: &[PrincipalId],
    ) -> Result<Vec<IndexRow>, StorageError<E>> {
        let mut rows = Vec::with_capacity(principal_ids.len());
        for chunk in principal_ids.chunks(self.batch_size()) {
            rows.extend(self.round_trip(self.store.get_memberships(chunk)).await?);
        }
        Ok(rows)
    }

    /// All groups the principal is (transitively) nested under, according to the reverse index.
    pub(crate) async fn ancestors(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<HashSet<PrincipalId>, StorageError<E>> {
        let rows = self
            .membership_rows(std::slice::from_ref(principal_id))
            .await?;
        Ok(rows
            .into_iter()
            .next()
            .map(|(_, groups)| groups)
            .unwrap_or_default())
    }

    /// Append direct members to the forward index row of a group.
    pub(crate) async fn write_members(
        &self,
        group_id: &PrincipalId,
        members: &HashSet<PrincipalId>,
    ) -> Result<(), StorageError<E>> {
        self.round_trip(self.store.add_members(group_id, members))
            .await
    }

    /// Append groups to reverse index rows, written in chunks.
    ///
    /// Chunks written before a failing one stay written.
    pub(crate) async fn write_memberships(
        &self,
        batch: &[IndexRow],
    ) -> Result<(), StorageError<E>> {
        for chunk in batch.chunks(self.batch_size()) {
            self.round_trip(self.store.add_memberships(chunk)).await?;
        }
        Ok(())
    }
}
