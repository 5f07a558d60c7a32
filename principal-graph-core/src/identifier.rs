// SPDX-License-Identifier: MIT OR Apache-2.0

//! Principal identifiers of the form `<kind>:<tenant>:<name>`.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between kind prefix, tenant and local name.
const SEPARATOR: char = ':';

/// Kind of a principal, encoded as the first character of its identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrincipalKind {
    User,
    Group,
}

impl PrincipalKind {
    /// Single-character prefix used in identifiers.
    pub fn prefix(&self) -> char {
        match self {
            PrincipalKind::User => 'u',
            PrincipalKind::Group => 'g',
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrincipalKind::User => write!(f, "user"),
            PrincipalKind::Group => write!(f, "group"),
        }
    }
}

/// Classified identifier of a user or group.
///
/// The identifier is the only source of truth for the kind and tenant of a principal: both are
/// derived from its textual form once, when parsing, and never re-parsed afterwards. The
/// `Display` implementation reproduces the original string exactly, which is what gets persisted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrincipalId {
    kind: PrincipalKind,
    tenant: String,
    name: String,
}

impl PrincipalId {
    /// Construct a user identifier `u:<tenant>:<name>`.
    pub fn user(tenant: &str, name: &str) -> Result<Self, IdentifierError> {
        Self::new(PrincipalKind::User, tenant, name)
    }

    /// Construct a group identifier `g:<tenant>:<name>`.
    pub fn group(tenant: &str, name: &str) -> Result<Self, IdentifierError> {
        Self::new(PrincipalKind::Group, tenant, name)
    }

    pub fn new(kind: PrincipalKind, tenant: &str, name: &str) -> Result<Self, IdentifierError> {
        if tenant.is_empty() || tenant.contains(SEPARATOR) {
            return Err(IdentifierError::MissingTenant(format!(
                "{}{SEPARATOR}{tenant}{SEPARATOR}{name}",
                kind.prefix()
            )));
        }

        if name.is_empty() {
            return Err(IdentifierError::MissingName(format!(
                "{}{SEPARATOR}{tenant}{SEPARATOR}",
                kind.prefix()
            )));
        }

        Ok(Self {
            kind,
            tenant: tenant.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Parse and classify a raw identifier.
    pub fn classify(value: &str) -> Result<Self, IdentifierError> {
        let kind = match value.get(..2) {
            Some("u:") => PrincipalKind::User,
            Some("g:") => PrincipalKind::Group,
            _ => return Err(IdentifierError::UnknownKind(value.to_owned())),
        };

        let Some((tenant, name)) = value[2..].split_once(SEPARATOR) else {
            return Err(IdentifierError::MissingTenant(value.to_owned()));
        };

        if tenant.is_empty() {
            return Err(IdentifierError::MissingTenant(value.to_owned()));
        }

        if name.is_empty() {
            return Err(IdentifierError::MissingName(value.to_owned()));
        }

        Ok(Self {
            kind,
            tenant: tenant.to_owned(),
            name: name.to_owned(),
        })
    }

    pub fn kind(&self) -> PrincipalKind {
        self.kind
    }

    /// Identifier of the tenant this principal is scoped to.
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Tenant-local name of the principal.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_user(&self) -> bool {
        self.kind == PrincipalKind::User
    }

    pub fn is_group(&self) -> bool {
        self.kind == PrincipalKind::Group
    }
}

impl FromStr for PrincipalId {
    type Err = IdentifierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::classify(value)
    }
}

impl TryFrom<&str> for PrincipalId {
    type Error = IdentifierError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::classify(value)
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::classify(&value)
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.kind.prefix(),
            self.tenant,
            self.name
        )
    }
}

impl fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrincipalId")
            .field(&self.to_string())
            .finish()
    }
}

impl Serialize for PrincipalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PrincipalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::classify(&value).map_err(|err| serde::de::Error::custom(err.to_string()))
    }
}

/// Error types for `PrincipalId`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// Identifier does not start with `u:` or `g:`.
    #[error("identifier '{0}' is neither a user nor a group identifier")]
    UnknownKind(String),

    /// Identifier has no tenant segment.
    #[error("identifier '{0}' is missing a tenant")]
    MissingTenant(String),

    /// Identifier has no local name after the tenant.
    #[error("identifier '{0}' is missing a name")]
    MissingName(String),
}
