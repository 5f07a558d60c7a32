// SPDX-License-Identifier: MIT OR Apache-2.0

use std::error::Error;

use principal_graph_core::{PrincipalId, PrincipalRecord};

/// Result of a multi-key principal lookup: the requested key and its row, `None` if the row is
/// empty.
pub type PrincipalRow = (PrincipalId, Option<PrincipalRecord>);

/// Interface for storing and querying principal metadata rows.
pub trait PrincipalStore {
    type Error: Error;

    /// Insert the metadata row of a principal.
    ///
    /// An existing row under the same identifier is silently replaced. Returns `true` when a new
    /// row was created and `false` when an existing one got overwritten.
    fn insert_principal(
        &self,
        id: &PrincipalId,
        record: PrincipalRecord,
    ) -> impl Future<Output = Result<bool, Self::Error>>;

    /// Fetch the rows of all given identifiers in one round trip.
    ///
    /// Returns exactly one entry per requested key, in request order. Missing rows are returned
    /// as `None` and are never reported as an error.
    fn get_principals(
        &self,
        ids: &[PrincipalId],
    ) -> impl Future<Output = Result<Vec<PrincipalRow>, Self::Error>>;
}
