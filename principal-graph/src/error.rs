// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use principal_graph_core::{IdentifierError, PrincipalId};
use thiserror::Error;

/// Coarse classification of directory errors.
///
/// Transport layers map these onto their own status codes, for example `NotFound` to 404,
/// `InvalidIdentifier`, `InvalidPrincipalKind` and `CycleDetected` to 400 and `Storage` to 500.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidIdentifier,
    NotFound,
    InvalidPrincipalKind,
    CycleDetected,
    Storage,
}

/// Failed round trip to the backing store.
#[derive(Debug, Error)]
pub enum StorageError<E> {
    #[error("store backend error: {0}")]
    Backend(E),

    #[error("store round trip timed out after {0:?}")]
    Timeout(Duration),

    #[error("store round trip was cancelled")]
    Cancelled,
}

/// Reasons why a principal can not take part in a membership change.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidPrincipal {
    #[error("'{0}' is neither a user nor a group identifier")]
    Unrecognised(String),

    #[error("group {0} can not be a member of itself")]
    SelfMembership(PrincipalId),

    #[error("principals {} do not exist", join(.0))]
    Unresolved(Vec<PrincipalId>),

    #[error("{0} is not a group identifier")]
    NotAGroup(PrincipalId),

    #[error("no principals given")]
    NoPrincipals,
}

fn join(ids: &[PrincipalId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum DirectoryError<E> {
    #[error(transparent)]
    InvalidIdentifier(#[from] IdentifierError),

    /// Principal is missing or hidden by its privacy setting.
    #[error("principal {0} not found")]
    NotFound(PrincipalId),

    #[error(transparent)]
    InvalidPrincipalKind(#[from] InvalidPrincipal),

    /// Adding the member to the group would make the group (transitively) contain itself.
    #[error("adding {member_id} to {group_id} would create a cycle")]
    CycleDetected {
        group_id: PrincipalId,
        member_id: PrincipalId,
    },

    #[error("{0}")]
    Storage(StorageError<E>),

    /// The forward index of the group was updated but updating the reverse index failed
    /// afterwards. The reverse index is missing ancestors until the group gets reconciled.
    #[error("members were added to {group_id} but its reverse index is stale: {source}")]
    ReverseIndexStale {
        group_id: PrincipalId,
        source: StorageError<E>,
    },
}

impl<E> DirectoryError<E> {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DirectoryError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            DirectoryError::NotFound(_) => ErrorKind::NotFound,
            DirectoryError::InvalidPrincipalKind(_) => ErrorKind::InvalidPrincipalKind,
            DirectoryError::CycleDetected { .. } => ErrorKind::CycleDetected,
            DirectoryError::Storage(_) | DirectoryError::ReverseIndexStale { .. } => {
                ErrorKind::Storage
            }
        }
    }
}

impl<E> From<StorageError<E>> for DirectoryError<E> {
    fn from(error: StorageError<E>) -> Self {
        DirectoryError::Storage(error)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::error::Error as _;
    use std::time::Duration;

    use principal_graph_core::test_utils::id;
    use principal_graph_core::{IdentifierError, PrincipalId};

    use super::{DirectoryError, ErrorKind, InvalidPrincipal, StorageError};

    type Error = DirectoryError<Infallible>;

    #[test]
    fn kinds() {
        let err: Error = "x:acme:oak".parse::<PrincipalId>().unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);

        let err: Error = InvalidPrincipal::NoPrincipals.into();
        assert_eq!(err.kind(), ErrorKind::InvalidPrincipalKind);

        let err: Error = StorageError::Timeout(Duration::from_secs(1)).into();
        assert_eq!(err.kind(), ErrorKind::Storage);

        // A stale reverse index is a storage failure, but stays distinguishable.
        let err: Error = DirectoryError::ReverseIndexStale {
            group_id: id("g:acme:oak"),
            source: StorageError::Cancelled,
        };
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!matches!(err, DirectoryError::Storage(_)));
    }

    #[test]
    fn messages() {
        let err: Error = DirectoryError::CycleDetected {
            group_id: id("g:acme:b"),
            member_id: id("g:acme:a"),
        };
        assert_eq!(
            err.to_string(),
            "adding g:acme:a to g:acme:b would create a cycle"
        );

        let err: Error =
            InvalidPrincipal::Unresolved(vec![id("u:acme:ada"), id("g:acme:oak")]).into();
        assert_eq!(
            err.to_string(),
            "principals u:acme:ada, g:acme:oak do not exist"
        );

        // The storage failure behind a stale reverse index stays reachable in the error chain.
        let err: Error = DirectoryError::ReverseIndexStale {
            group_id: id("g:acme:oak"),
            source: StorageError::Timeout(Duration::from_secs(5)),
        };
        assert_eq!(
            err.to_string(),
            "members were added to g:acme:oak but its reverse index is stale: store round trip \
             timed out after 5s"
        );
        let source = err.source().expect("stale reverse index has a source");
        assert_eq!(source.to_string(), "store round trip timed out after 5s");

        let err: Error = IdentifierError::UnknownKind("oak".into()).into();
        assert_eq!(
            err.to_string(),
            IdentifierError::UnknownKind("oak".into()).to_string()
        );
    }
}
