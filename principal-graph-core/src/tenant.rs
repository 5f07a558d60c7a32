// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{IdentifierError, PrincipalId};

/// Tenant of the directory.
///
/// Every principal is scoped to exactly one tenant, encoded in its identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tenant {
    pub id: String,
    pub name: String,
}

impl Tenant {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Identifier of a group with the given name inside this tenant.
    pub fn group_id(&self, name: &str) -> Result<PrincipalId, IdentifierError> {
        PrincipalId::group(&self.id, name)
    }

    /// Identifier of a user with the given name inside this tenant.
    pub fn user_id(&self, name: &str) -> Result<PrincipalId, IdentifierError> {
        PrincipalId::user(&self.id, name)
    }

    /// Returns `true` if the principal is scoped to this tenant.
    pub fn owns(&self, id: &PrincipalId) -> bool {
        id.tenant() == self.id
    }
}
